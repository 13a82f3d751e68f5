use std::env;
use std::sync::Arc;

use auth::SigningKey;
use auth::TokenManager;
use auth::TokenPolicy;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::identity::models::AuthSettings;
use crate::domain::identity::models::AuthoritySource;
use crate::identity::errors::AuthError;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; absent runs on the in-memory identity store
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    /// Base64 encoded HMAC secret, at least 32 bytes once decoded
    pub secret: Option<String>,
    pub access_token_expiration_ms: i64,
    pub refresh_token_expiration_ms: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("access_token_expiration_ms", &self.access_token_expiration_ms)
            .field("refresh_token_expiration_ms", &self.refresh_token_expiration_ms)
            .finish()
    }
}

impl JwtConfig {
    /// Derive the signing key from the configured secret.
    ///
    /// # Errors
    /// * `Configuration` - Secret is missing, not Base64, or shorter than 256 bits
    pub fn signing_key(&self) -> Result<SigningKey, AuthError> {
        SigningKey::from_base64_secret(self.secret.as_deref())
            .map_err(|e| AuthError::Configuration(format!("jwt.secret: {}", e)))
    }

    /// # Errors
    /// * `Configuration` - A TTL is shorter than one second
    pub fn token_policy(&self) -> Result<TokenPolicy, AuthError> {
        TokenPolicy::from_millis(
            self.access_token_expiration_ms,
            self.refresh_token_expiration_ms,
        )
        .map_err(|e| AuthError::Configuration(e.to_string()))
    }

    /// Build the token engine shared by the orchestrator and the bearer middleware.
    pub fn token_manager(&self) -> Result<TokenManager, AuthError> {
        Ok(TokenManager::new(
            Arc::new(self.signing_key()?),
            self.token_policy()?,
        ))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub default_role: String,
    pub refresh_authorities: AuthoritySource,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let settings = AuthSettings::default();
        Self {
            default_role: settings.default_role,
            refresh_authorities: settings.refresh_authorities,
        }
    }
}

impl From<&AuthConfig> for AuthSettings {
    fn from(config: &AuthConfig) -> Self {
        Self {
            default_role: config.default_role.clone(),
            refresh_authorities: config.refresh_authorities,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator, no prefix)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
