use std::sync::Arc;

use auth::AccessGuard;
use auth::Identity;
use auth::Role;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Required role for one group of routes.
#[derive(Clone)]
pub struct RoleGate {
    guard: Arc<AccessGuard>,
    required: Role,
}

impl RoleGate {
    pub fn new(guard: Arc<AccessGuard>, required: Role) -> Self {
        Self { guard, required }
    }
}

/// Middleware that validates the bearer token and adds the caller's [`Identity`]
/// to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = state
        .access_guard
        .authenticate(bearer_token(req.headers())?)?;

    tracing::debug!(
        subject = %identity.subject(),
        role = %identity.role(),
        "Request authenticated"
    );

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Middleware that admits the request only if the authenticated role satisfies the gate.
///
/// Must run after [`authenticate`].
pub async fn require_role(
    State(gate): State<RoleGate>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    gate.guard.require_role(identity, gate.required)?;

    Ok(next.run(req).await)
}

/// Extract the raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Not authenticated".to_string()))?;

    match auth_str.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => Err(ApiError::Unauthorized("Not authenticated".to_string())),
    }
}
