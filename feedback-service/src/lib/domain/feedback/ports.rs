use async_trait::async_trait;

use crate::feedback::errors::FeedbackError;
use crate::feedback::models::Feedback;
use crate::feedback::models::FeedbackId;
use crate::feedback::models::SubmitFeedbackCommand;

/// Port for feedback domain service operations.
#[async_trait]
pub trait FeedbackServicePort: Send + Sync + 'static {
    /// Store a new feedback submission.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn submit_feedback(&self, command: SubmitFeedbackCommand)
        -> Result<Feedback, FeedbackError>;

    /// Retrieve every submission, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_feedback(&self) -> Result<Vec<Feedback>, FeedbackError>;

    /// Remove a submission.
    ///
    /// # Errors
    /// * `NotFound` - Feedback does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_feedback(&self, id: &FeedbackId) -> Result<(), FeedbackError>;
}

/// Persistence operations for feedback submissions.
#[async_trait]
pub trait FeedbackRepository: Send + Sync + 'static {
    async fn create(&self, feedback: Feedback) -> Result<Feedback, FeedbackError>;

    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackError>;

    /// Remove a submission.
    ///
    /// # Errors
    /// * `NotFound` - No row was deleted
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &FeedbackId) -> Result<(), FeedbackError>;
}
