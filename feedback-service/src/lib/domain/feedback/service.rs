use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::feedback::errors::FeedbackError;
use crate::feedback::models::Feedback;
use crate::feedback::models::FeedbackId;
use crate::feedback::models::SubmitFeedbackCommand;
use crate::feedback::ports::FeedbackRepository;
use crate::feedback::ports::FeedbackServicePort;

pub struct FeedbackService<FR>
where
    FR: FeedbackRepository,
{
    repository: Arc<FR>,
}

impl<FR> FeedbackService<FR>
where
    FR: FeedbackRepository,
{
    pub fn new(repository: Arc<FR>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<FR> FeedbackServicePort for FeedbackService<FR>
where
    FR: FeedbackRepository,
{
    async fn submit_feedback(
        &self,
        command: SubmitFeedbackCommand,
    ) -> Result<Feedback, FeedbackError> {
        let feedback = Feedback {
            id: FeedbackId::new(),
            name: command.name,
            message: command.message,
            email: command.email,
            phone: command.phone,
            created_at: Utc::now(),
        };

        let created = self.repository.create(feedback).await?;
        tracing::info!(feedback_id = %created.id, "Feedback submitted");

        Ok(created)
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, FeedbackError> {
        self.repository.list_all().await
    }

    async fn delete_feedback(&self, id: &FeedbackId) -> Result<(), FeedbackError> {
        self.repository.delete(id).await?;
        tracing::info!(feedback_id = %id, "Feedback deleted");
        Ok(())
    }
}
