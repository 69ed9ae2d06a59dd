use auth::Role;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::UserResponseData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::UsernameError;
use crate::user::ports::UserServicePort;

/// Open registration for plain users.
///
/// Requesting any other role requires the caller to present an admin token.
pub async fn register_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterUserRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let command = body.try_into_command()?;

    if command.role != Role::User {
        let identity = state.access_guard.authenticate(bearer_token(&headers)?)?;
        let admin = state.access_guard.require_role(identity, Role::Admin)?;
        tracing::info!(
            admin = %admin.subject(),
            username = %command.username,
            role = %command.role,
            "Elevated registration authorized"
        );
    }

    state
        .user_service
        .register_user(command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Role,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterUserRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}

impl RegisterUserRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, ParseRegisterUserRequestError> {
        let username = Username::new(self.username)?;
        let email = EmailAddress::new(self.email)?;
        Ok(RegisterUserCommand::new(
            username,
            email,
            self.password,
            self.role,
        ))
    }
}

impl From<ParseRegisterUserRequestError> for ApiError {
    fn from(err: ParseRegisterUserRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
