use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::feedback::errors::FeedbackError;
use crate::feedback::models::FeedbackId;
use crate::feedback::ports::FeedbackServicePort;
use crate::inbound::http::router::AppState;

pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let feedback_id = FeedbackId::from_string(&id).map_err(FeedbackError::from)?;

    state
        .feedback_service
        .delete_feedback(&feedback_id)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageData::new("Feedback deleted successfully"),
            )
        })
}
