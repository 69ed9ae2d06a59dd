use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::feedback::errors::FeedbackFieldError;
use crate::feedback::errors::FeedbackIdError;

/// A feedback submission.
#[derive(Debug, Clone)]
pub struct Feedback {
    pub id: FeedbackId,
    pub name: SenderName,
    pub message: FeedbackMessage,
    pub email: ContactEmail,
    pub phone: PhoneNumber,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedbackId(pub Uuid);

impl FeedbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a feedback ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, FeedbackIdError> {
        Uuid::parse_str(s)
            .map(FeedbackId)
            .map_err(|e| FeedbackIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), FeedbackFieldError> {
    let actual = value.chars().count();
    if actual < min {
        Err(FeedbackFieldError::TooShort { field, min, actual })
    } else if actual > max {
        Err(FeedbackFieldError::TooLong { field, max, actual })
    } else {
        Ok(())
    }
}

/// Sender display name.
///
/// 2-50 characters: letters of any script, digits, underscore, hyphen and whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderName(String);

impl SenderName {
    const FIELD: &'static str = "Name";

    pub fn new(name: String) -> Result<Self, FeedbackFieldError> {
        check_length(Self::FIELD, &name, 2, 50)?;
        if name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace())
        {
            Ok(Self(name))
        } else {
            Err(FeedbackFieldError::InvalidCharacters { field: Self::FIELD })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-text body, 10-2000 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage(String);

impl FeedbackMessage {
    pub fn new(message: String) -> Result<Self, FeedbackFieldError> {
        check_length("Message", &message, 10, 2000)?;
        Ok(Self(message))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn new(email: String) -> Result<Self, FeedbackFieldError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| Self(email))
            .map_err(|e| FeedbackFieldError::InvalidEmail(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional phone number, empty when not provided.
///
/// Up to 20 characters of digits, `+`, parentheses, whitespace and hyphen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const FIELD: &'static str = "Phone";

    pub fn new(phone: String) -> Result<Self, FeedbackFieldError> {
        check_length(Self::FIELD, &phone, 0, 20)?;
        if phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '(' | ')' | '-') || c.is_whitespace())
        {
            Ok(Self(phone))
        } else {
            Err(FeedbackFieldError::InvalidCharacters { field: Self::FIELD })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to submit feedback with validated fields
#[derive(Debug)]
pub struct SubmitFeedbackCommand {
    pub name: SenderName,
    pub message: FeedbackMessage,
    pub email: ContactEmail,
    pub phone: PhoneNumber,
}
