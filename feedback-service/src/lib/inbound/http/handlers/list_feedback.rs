use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::FeedbackResponseData;
use crate::feedback::ports::FeedbackServicePort;
use crate::inbound::http::router::AppState;

pub async fn list_feedback(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<FeedbackResponseData>>, ApiError> {
    state
        .feedback_service
        .list_feedback()
        .await
        .map_err(ApiError::from)
        .map(|items| ApiSuccess::new(StatusCode::OK, items.iter().map(Into::into).collect()))
}
