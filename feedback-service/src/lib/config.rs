use std::env;
use std::str::FromStr;

use auth::Algorithm;
use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Upper bound on `jwt.expiration_minutes` (one year).
const MAX_EXPIRATION_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

/// Admin account registered at startup when absent.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_expiration_minutes() -> i64 {
    TokenSettings::DEFAULT_TTL_MINUTES
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }

    pub fn token_settings(&self) -> Result<TokenSettings, ConfigError> {
        self.jwt.token_settings()
    }
}

impl JwtConfig {
    /// Build the immutable token settings shared by the authenticator and the guard.
    ///
    /// # Errors
    /// * `Message` - Empty secret, unknown or asymmetric algorithm, TTL not in 1..=one year
    pub fn token_settings(&self) -> Result<TokenSettings, ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }

        let algorithm = Algorithm::from_str(&self.algorithm)
            .map_err(|e| ConfigError::Message(format!("jwt.algorithm: {}", e)))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::Message(format!(
                "jwt.algorithm {:?} is not an HMAC algorithm",
                algorithm
            )));
        }

        if self.expiration_minutes <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_minutes must be positive".into(),
            ));
        }
        if self.expiration_minutes > MAX_EXPIRATION_MINUTES {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_minutes must not exceed {}",
                MAX_EXPIRATION_MINUTES
            )));
        }
        let ttl = chrono::Duration::try_minutes(self.expiration_minutes).ok_or_else(|| {
            ConfigError::Message("jwt.expiration_minutes is out of range".into())
        })?;

        Ok(TokenSettings::new(self.secret.as_bytes())
            .with_algorithm(algorithm)
            .with_ttl(ttl))
    }
}
