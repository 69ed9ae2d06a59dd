use auth::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserResponseData;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserServicePort;

pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let username = subject_username(&identity)?;

    state
        .user_service
        .get_user_by_username(&username)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// Token subjects are usernames; anything else cannot have been issued here.
pub(super) fn subject_username(identity: &Identity) -> Result<Username, ApiError> {
    Username::new(identity.subject().to_string())
        .map_err(|_| ApiError::Unauthorized("Could not validate credentials".to_string()))
}
