use thiserror::Error;

/// Error for FeedbackId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedbackIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for feedback field validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedbackFieldError {
    #[error("{field} too short: minimum {min} characters, got {actual}")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field} too long: maximum {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} contains invalid characters")]
    InvalidCharacters { field: &'static str },

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
}

/// Top-level error for all feedback-related operations
#[derive(Debug, Clone, Error)]
pub enum FeedbackError {
    #[error("Invalid feedback ID: {0}")]
    InvalidFeedbackId(#[from] FeedbackIdError),

    #[error("Invalid feedback: {0}")]
    InvalidField(#[from] FeedbackFieldError),

    #[error("Feedback not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
