#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::AccessGuard;
use auth::Authenticator;
use auth::JwtHandler;
use auth::Role;
use auth::TokenSettings;
use feedback_service::domain::feedback::errors::FeedbackError;
use feedback_service::domain::feedback::models::Feedback;
use feedback_service::domain::feedback::models::FeedbackId;
use feedback_service::domain::feedback::ports::FeedbackRepository;
use feedback_service::domain::feedback::service::FeedbackService;
use feedback_service::domain::user::errors::UserError;
use feedback_service::domain::user::models::EmailAddress;
use feedback_service::domain::user::models::RegisterUserCommand;
use feedback_service::domain::user::models::User;
use feedback_service::domain::user::models::UserId;
use feedback_service::domain::user::models::Username;
use feedback_service::domain::user::ports::UserRepository;
use feedback_service::domain::user::ports::UserServicePort;
use feedback_service::domain::user::service::UserService;
use feedback_service::inbound::http::router::create_router;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "pass_word!";

/// User storage held in memory, enforcing username uniqueness like the real table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(UserError::NotFound(user.id.to_string())),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    items: Mutex<Vec<Feedback>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn create(&self, feedback: Feedback) -> Result<Feedback, FeedbackError> {
        self.items.lock().unwrap().push(feedback.clone());
        Ok(feedback)
    }

    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackError> {
        Ok(self.items.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn delete(&self, id: &FeedbackId) -> Result<(), FeedbackError> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|f| f.id != *id);
        if items.len() == before {
            return Err(FeedbackError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let settings = TokenSettings::new(JWT_SECRET);
        let authenticator = Arc::new(Authenticator::new(&settings));
        let access_guard = Arc::new(AccessGuard::new(&settings));

        let user_service = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::default()),
            authenticator,
        ));
        let feedback_service = Arc::new(FeedbackService::new(Arc::new(
            InMemoryFeedbackRepository::default(),
        )));

        let router = create_router(user_service.clone(), feedback_service, access_guard);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            jwt_handler: JwtHandler::new(JWT_SECRET),
            user_service,
        }
    }

    /// Insert a user directly through the domain service, bypassing the HTTP role check.
    pub async fn seed_user(&self, username: &str, role: Role) -> User {
        self.user_service
            .register_user(RegisterUserCommand::new(
                Username::new(username.to_string()).unwrap(),
                EmailAddress::new(format!("{}@example.com", username)).unwrap(),
                PASSWORD.to_string(),
                role,
            ))
            .await
            .expect("Failed to seed user")
    }

    /// Log in through the token endpoint and return the access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/auth/token")
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }

    /// Seed a user with `role` and return a token obtained through login.
    pub async fn token_for(&self, username: &str, role: Role) -> String {
        self.seed_user(username, role).await;
        self.login(username, PASSWORD).await
    }

    /// Sign a token directly, for expiry and forgery scenarios.
    pub fn sign_token(&self, subject: &str, role: Role, ttl: chrono::Duration) -> String {
        self.jwt_handler
            .issue(subject, role, ttl)
            .expect("Failed to sign token")
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }
}
