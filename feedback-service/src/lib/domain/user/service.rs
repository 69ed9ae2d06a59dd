use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::AdminUpdateUserCommand;
use crate::domain::user::models::IssuedToken;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        self.authenticator
            .hash_password(password)
            .map_err(|e| UserError::PasswordHashing(e.to_string()))
    }

    async fn find_existing(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(UserError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        let password_hash = self.hash_password(&command.password)?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            role: command.role,
            is_active: true,
            created_at: Utc::now(),
        };

        // The unique constraint still decides a race between the check and this insert.
        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            role = %created_user.role,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, UserError> {
        let user = match Username::new(command.username) {
            Ok(username) => self.repository.find_by_username(&username).await?,
            Err(_) => None,
        };

        let user = match user {
            Some(user) if user.is_active => user,
            Some(user) => {
                tracing::info!(username = %user.username, "Login refused for inactive user");
                return Err(self.authenticator.reject(&command.password).into());
            }
            None => return Err(self.authenticator.reject(&command.password).into()),
        };

        let result = self.authenticator.authenticate(
            &command.password,
            &user.password_hash,
            user.username.as_str(),
            user.role,
        )?;

        tracing::info!(username = %user.username, role = %user.role, "Access token issued");

        Ok(IssuedToken::bearer(result.access_token, result.expires_in))
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.find_existing(id).await
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_profile(
        &self,
        username: &Username,
        command: UpdateProfileCommand,
    ) -> Result<User, UserError> {
        let mut user = self.get_user_by_username(username).await?;

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(&new_password)?;
        }

        self.repository.update(user).await
    }

    async fn admin_update_user(
        &self,
        id: &UserId,
        command: AdminUpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self.find_existing(id).await?;

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(&new_password)?;
        }

        if let Some(new_role) = command.role {
            user.role = new_role;
        }

        if let Some(is_active) = command.is_active {
            user.is_active = is_active;
        }

        let updated_user = self.repository.update(user).await?;

        tracing::info!(
            user_id = %updated_user.id,
            role = %updated_user.role,
            is_active = updated_user.is_active,
            "User updated by admin"
        );

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

impl From<AuthenticationError> for UserError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
            AuthenticationError::JwtError(e) => UserError::TokenIssuance(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use auth::JwtHandler;
    use auth::PasswordHasher;
    use auth::Role;
    use auth::TokenSettings;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Username;

    const SECRET: &str = "user_service_test_secret_at_least_32_bytes";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    fn service(repository: MockTestUserRepository) -> UserService<MockTestUserRepository> {
        let authenticator = Authenticator::new(&TokenSettings::new(SECRET));
        UserService::new(Arc::new(repository), Arc::new(authenticator))
    }

    fn stored_user(username: &str, password: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn register_command(username: &str, role: Role) -> RegisterUserCommand {
        RegisterUserCommand::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            "password123".to_string(),
            role,
        )
    }

    fn login_command(username: &str, password: &str) -> LoginCommand {
        LoginCommand {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "testuser"
                    && user.email.as_str() == "testuser@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "password123"
                    && user.role == Role::Moderator
                    && user.is_active
            })
            .times(1)
            .returning(Ok);

        let user = service(repository)
            .register_user(register_command("testuser", Role::Moderator))
            .await
            .unwrap();

        assert_eq!(user.username.as_str(), "testuser");
        assert_eq!(user.role, Role::Moderator);
        assert!(PasswordHasher::new().verify("password123", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_user_duplicate_precheck() {
        let mut repository = MockTestUserRepository::new();

        let existing = stored_user("testuser", "original", Role::User);
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_create().times(0);

        let result = service(repository)
            .register_user(register_command("testuser", Role::User))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            UserError::UsernameAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_register_user_duplicate_from_storage() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_create().times(1).returning(|user| {
            Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let result = service(repository)
            .register_user(register_command("testuser", Role::User))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            UserError::UsernameAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_login_success_embeds_current_role() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("alice", "secret-pass", Role::Moderator);
        repository
            .expect_find_by_username()
            .withf(|u| u.as_str() == "alice")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let token = service(repository)
            .login(login_command("alice", "secret-pass"))
            .await
            .unwrap();

        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 30 * 60);

        let claims = JwtHandler::new(SECRET.as_bytes())
            .decode(&token.access_token)
            .unwrap();
        assert_eq!(claims.subject, "alice");
        assert_eq!(claims.role, Role::Moderator);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_user_are_indistinguishable() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("alice", "secret-pass", Role::User);
        repository
            .expect_find_by_username()
            .returning(move |u| {
                if u.as_str() == "alice" {
                    Ok(Some(user.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = service(repository);
        let wrong_password = service
            .login(login_command("alice", "wrongpass"))
            .await
            .unwrap_err();
        let unknown_user = service
            .login(login_command("nonexistent_user", "anything"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, UserError::InvalidCredentials));
        assert!(matches!(unknown_user, UserError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_malformed_username_skips_lookup() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);

        let result = service(repository)
            .login(login_command("a b", "anything"))
            .await;

        assert!(matches!(result.unwrap_err(), UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_inactive_user_rejected() {
        let mut repository = MockTestUserRepository::new();

        let mut user = stored_user("alice", "secret-pass", Role::Admin);
        user.is_active = false;
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let result = service(repository)
            .login(login_command("alice", "secret-pass"))
            .await;

        assert!(matches!(result.unwrap_err(), UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository).get_user(&UserId::new()).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_user_by_username_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let username = Username::new("nonexistent".to_string()).unwrap();
        let result = service(repository).get_user_by_username(&username).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::NotFoundByUsername(_)
        ));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repository = MockTestUserRepository::new();

        let users = vec![
            stored_user("user1", "pw", Role::User),
            stored_user("user2", "pw", Role::Admin),
        ];
        repository
            .expect_list_all()
            .times(1)
            .returning(move || Ok(users.clone()));

        let result = service(repository).list_users().await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_update_profile_rehashes_password() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("alice", "old-pass", Role::User);
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_update()
            .withf(|user| {
                user.email.as_str() == "new@example.com"
                    && PasswordHasher::new().verify("new-pass", &user.password_hash)
                    && user.role == Role::User
            })
            .times(1)
            .returning(Ok);

        let command = UpdateProfileCommand {
            email: Some(EmailAddress::new("new@example.com".to_string()).unwrap()),
            password: Some("new-pass".to_string()),
        };
        let username = Username::new("alice".to_string()).unwrap();

        let updated = service(repository)
            .update_profile(&username, command)
            .await
            .unwrap();
        assert_eq!(updated.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_admin_update_user_changes_role_and_status() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("bob", "pw", Role::User);
        let user_id = user.id;
        let original_hash = user.password_hash.clone();
        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_update()
            .withf(move |user| {
                user.role == Role::Moderator
                    && !user.is_active
                    && user.username.as_str() == "bob"
                    && user.password_hash == original_hash
            })
            .times(1)
            .returning(Ok);

        let command = AdminUpdateUserCommand {
            role: Some(Role::Moderator),
            is_active: Some(false),
            ..Default::default()
        };

        let updated = service(repository)
            .admin_update_user(&user_id, command)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Moderator);
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_admin_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_update().times(0);

        let result = service(repository)
            .admin_update_user(&UserId::new(), AdminUpdateUserCommand::default())
            .await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        let user_id = UserId::new();
        repository
            .expect_delete()
            .times(1)
            .returning(move |_| Err(UserError::NotFound(user_id.to_string())));

        let result = service(repository).delete_user(&user_id).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }
}
