use std::sync::Arc;

use auth::AccessGuard;
use auth::Authenticator;
use auth::Role;
use feedback_service::config::BootstrapAdminConfig;
use feedback_service::config::Config;
use feedback_service::domain::feedback::service::FeedbackService;
use feedback_service::domain::user::errors::UserError;
use feedback_service::domain::user::models::EmailAddress;
use feedback_service::domain::user::models::RegisterUserCommand;
use feedback_service::domain::user::models::Username;
use feedback_service::domain::user::ports::UserServicePort;
use feedback_service::domain::user::service::UserService;
use feedback_service::inbound::http::router::create_router;
use feedback_service::outbound::repositories::PostgresFeedbackRepository;
use feedback_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedback_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "feedback-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let token_settings = config.token_settings()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_algorithm = ?token_settings.algorithm(),
        token_ttl_minutes = token_settings.ttl().num_minutes(),
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(Authenticator::new(&token_settings));
    let access_guard = Arc::new(AccessGuard::new(&token_settings));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let feedback_repository = Arc::new(PostgresFeedbackRepository::new(pg_pool));

    let user_service = Arc::new(UserService::new(user_repository, authenticator));
    let feedback_service = Arc::new(FeedbackService::new(feedback_repository));

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_admin(user_service.as_ref(), admin).await?;
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, feedback_service, access_guard);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

/// Register the configured admin account unless the username is already taken.
async fn bootstrap_admin(
    user_service: &dyn UserServicePort,
    admin: &BootstrapAdminConfig,
) -> Result<(), anyhow::Error> {
    let command = RegisterUserCommand::new(
        Username::new(admin.username.clone())?,
        EmailAddress::new(admin.email.clone())?,
        admin.password.clone(),
        Role::Admin,
    );

    match user_service.register_user(command).await {
        Ok(user) => {
            tracing::info!(username = %user.username, "Bootstrap admin created");
            Ok(())
        }
        Err(UserError::UsernameAlreadyExists(username)) => {
            tracing::info!(username = %username, "Bootstrap admin already present");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
