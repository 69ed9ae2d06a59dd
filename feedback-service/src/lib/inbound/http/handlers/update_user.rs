use auth::Role;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserResponseData;
use crate::domain::user::models::AdminUpdateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

/// Admin edit body; unknown fields such as `username` are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<AdminUpdateUserCommand, UserError> {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .map(EmailAddress::new)
            .transpose()?;

        Ok(AdminUpdateUserCommand {
            email,
            password: self.password.filter(|p| !p.is_empty()),
            role: self.role,
            is_active: self.is_active,
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let command = req.try_into_command()?;

    state
        .user_service
        .admin_update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
