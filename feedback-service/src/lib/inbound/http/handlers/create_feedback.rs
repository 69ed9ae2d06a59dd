use auth::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::FeedbackResponseData;
use crate::feedback::errors::FeedbackFieldError;
use crate::feedback::models::ContactEmail;
use crate::feedback::models::FeedbackMessage;
use crate::feedback::models::PhoneNumber;
use crate::feedback::models::SenderName;
use crate::feedback::models::SubmitFeedbackCommand;
use crate::feedback::ports::FeedbackServicePort;
use crate::inbound::http::router::AppState;

pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<CreateFeedbackRequest>,
) -> Result<ApiSuccess<FeedbackResponseData>, ApiError> {
    let command = body
        .try_into_command()
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    tracing::debug!(submitted_by = %identity.subject(), "Feedback received");

    state
        .feedback_service
        .submit_feedback(command)
        .await
        .map_err(ApiError::from)
        .map(|ref feedback| ApiSuccess::new(StatusCode::CREATED, feedback.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateFeedbackRequest {
    name: String,
    message: String,
    email: String,
    #[serde(default)]
    phone: String,
}

impl CreateFeedbackRequest {
    fn try_into_command(self) -> Result<SubmitFeedbackCommand, FeedbackFieldError> {
        Ok(SubmitFeedbackCommand {
            name: SenderName::new(self.name)?,
            message: FeedbackMessage::new(self.message)?,
            email: ContactEmail::new(self.email)?,
            phone: PhoneNumber::new(self.phone)?,
        })
    }
}
