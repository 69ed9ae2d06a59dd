use auth::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserResponseData;
use super::get_current_user::subject_username;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateProfileCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

#[derive(Debug, Deserialize)]
pub struct UpdateCurrentUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateCurrentUserRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, UserError> {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .map(EmailAddress::new)
            .transpose()?;

        Ok(UpdateProfileCommand {
            email,
            password: self.password.filter(|p| !p.is_empty()),
        })
    }
}

pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdateCurrentUserRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let username = subject_username(&identity)?;
    let command = req.try_into_command()?;

    state
        .user_service
        .update_profile(&username, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
