use std::{env, fmt, net::SocketAddr, str::FromStr};

use rand::Rng;
use tracing::warn;
use url::Url;

const DEFAULT_WEB_URL: &str = "http://localhost:3000";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/feedback.db";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ENVIRONMENT value: {0}. Use 'production', 'development' or 'test'")]
    InvalidEnvironment(String),
    #[error("Invalid WEB_URL: {0}")]
    InvalidWebUrl(String),
    #[error("Invalid BIND_ADDRESS: {0}")]
    InvalidBindAddress(String),
    #[error("SECRET_KEY must be set in production")]
    MissingSecret,
    #[error("SECRET_KEY must be at least {MIN_SECRET_LEN} bytes in production")]
    WeakSecret,
    #[error("SECRET_KEY appears to be a placeholder value")]
    PlaceholderSecret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl Environment {
    /// Whether debug-only response fields (the `__token` echo) may be sent.
    pub fn exposes_debug_tokens(self) -> bool {
        matches!(self, Environment::Development | Environment::Test)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Test => "test",
        };
        f.write_str(name)
    }
}

/// Process-wide settings, built once at startup and handed to every service
/// that needs them.
#[derive(Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub web_url: Url,
    pub secret_key: String,
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub mail_from: Option<String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("web_url", &self.web_url.as_str())
            .field("secret_key", &"<redacted>")
            .field("database_url", &self.database_url)
            .field("bind_address", &self.bind_address)
            .field("mail_from", &self.mail_from)
            .finish()
    }
}

impl AppConfig {
    /// Minimal configuration for tests and tooling.
    pub fn new(environment: Environment, web_url: Url, secret_key: impl Into<String>) -> Self {
        Self {
            environment,
            web_url,
            secret_key: secret_key.into(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            mail_from: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("ENVIRONMENT") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => Environment::Production,
        };

        let web_url_raw = env::var("WEB_URL").unwrap_or_else(|_| DEFAULT_WEB_URL.to_string());
        let web_url = Url::parse(&web_url_raw)
            .map_err(|e| ConfigError::InvalidWebUrl(format!("{}: {}", web_url_raw, e)))?;
        if web_url.host_str().is_none() {
            return Err(ConfigError::InvalidWebUrl(web_url_raw));
        }

        let bind_raw =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddress(bind_raw))?;

        let secret_key = match env::var("SECRET_KEY") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment == Environment::Production => return Err(ConfigError::MissingSecret),
            _ => {
                warn!("SECRET_KEY not set; generating ephemeral key (development only)");
                generate_ephemeral_secret()
            }
        };

        let config = Self {
            environment,
            web_url,
            secret_key,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_address,
            mail_from: env::var("MAIL_FROM").ok().filter(|v| !v.trim().is_empty()),
        };
        config.validate()?;

        Ok(config)
    }

    /// Production refuses short or placeholder signing keys.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Production {
            return Ok(());
        }

        if self.secret_key.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        let lowered = self.secret_key.to_ascii_lowercase();
        if ["changeme", "example", "default", "secret"]
            .iter()
            .any(|placeholder| lowered.contains(placeholder))
        {
            return Err(ConfigError::PlaceholderSecret);
        }

        Ok(())
    }

    /// `scheme://host[:port]` of the public site.
    pub fn web_origin(&self) -> String {
        self.web_url.origin().ascii_serialization()
    }

    pub fn web_host(&self) -> &str {
        self.web_url.host_str().unwrap_or("localhost")
    }

    pub fn sender_address(&self) -> String {
        self.mail_from
            .clone()
            .unwrap_or_else(|| format!("noreply@{}", self.web_host()))
    }

    pub fn submission_link(&self, token: &str) -> String {
        format!(
            "{}/feedback/submit?token={}",
            self.web_origin(),
            urlencoding::encode(token)
        )
    }

    pub fn post_link(&self, slug: &str) -> String {
        format!("{}/posts/{}", self.web_origin(), slug)
    }
}

fn generate_ephemeral_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect()
}
