use std::sync::Arc;
use std::time::Duration;

use auth::AccessGuard;
use auth::Role;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_feedback::create_feedback;
use super::handlers::delete_feedback::delete_feedback;
use super::handlers::delete_user::delete_user;
use super::handlers::get_current_user::get_current_user;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::list_feedback::list_feedback;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::moderator_test::moderator_test;
use super::handlers::register_user::register_user;
use super::handlers::update_current_user::update_current_user;
use super::handlers::update_user::update_user;
use super::middleware::authenticate;
use super::middleware::require_role;
use super::middleware::RoleGate;
use crate::feedback::ports::FeedbackServicePort;
use crate::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub feedback_service: Arc<dyn FeedbackServicePort>,
    pub access_guard: Arc<AccessGuard>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    feedback_service: Arc<dyn FeedbackServicePort>,
    access_guard: Arc<AccessGuard>,
) -> Router {
    let state = AppState {
        user_service,
        feedback_service,
        access_guard,
    };

    let public_routes = Router::new()
        .route("/auth/token", post(login))
        .route("/auth/register", post(register_user))
        .route("/api/health", get(health))
        .route("/api/moderator/test", get(moderator_test));

    let authenticated_routes = Router::new()
        .route("/api/users/me", get(get_current_user).put(update_current_user))
        .route("/api/feedback", get(list_feedback).post(create_feedback))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let moderator_routes = Router::new()
        .route("/api/feedback/:feedback_id", delete(delete_feedback))
        .route("/api/moderator/feedbacks", get(list_feedback))
        .route_layer(middleware::from_fn_with_state(
            RoleGate::new(Arc::clone(&state.access_guard), Role::Moderator),
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let admin_routes = Router::new()
        .route("/api/admin/users", get(list_users))
        .route(
            "/api/admin/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGate::new(Arc::clone(&state.access_guard), Role::Admin),
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(moderator_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
