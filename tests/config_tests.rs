use std::{collections::HashMap, env};

use feedback_board::config::{AppConfig, ConfigError, Environment};
use serial_test::serial;

const CONFIG_VARS: [&str; 7] = [
    "ENVIRONMENT",
    "WEB_URL",
    "SECRET_KEY",
    "DATABASE_URL",
    "BIND_ADDRESS",
    "MAIL_FROM",
    "SMTP_HOST",
];

#[derive(Default)]
struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    /// Starts from an environment with none of the config variables set.
    fn clean() -> Self {
        let mut guard = Self::default();
        for key in CONFIG_VARS {
            guard.remove(key);
        }
        guard
    }

    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::set_var(key, value.into());
    }

    fn remove(&mut self, key: &str) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::remove_var(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.original.drain() {
            match value {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
}

#[test]
#[serial]
fn production_is_the_default_and_requires_a_secret() {
    let _env = EnvGuard::clean();

    assert!(matches!(AppConfig::from_env(), Err(ConfigError::MissingSecret)));
}

#[test]
#[serial]
fn production_defaults_with_strong_secret() {
    let mut env = EnvGuard::clean();
    env.set("SECRET_KEY", "q8Zr2Lw9Xc4Vb7Nm1Kj6Hg3Fd5Sa0Pt8Yu2Io4");

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.web_origin(), "http://localhost:3000");
    assert_eq!(config.database_url, "sqlite://data/feedback.db");
    assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
    assert_eq!(config.sender_address(), "noreply@localhost");
    assert!(!config.environment.exposes_debug_tokens());
}

#[test]
#[serial]
fn production_rejects_placeholder_secret() {
    let mut env = EnvGuard::clean();
    env.set("SECRET_KEY", "changeme-changeme-changeme-changeme");

    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::PlaceholderSecret)
    ));
}

#[test]
#[serial]
fn development_generates_ephemeral_secret() {
    let mut env = EnvGuard::clean();
    env.set("ENVIRONMENT", "development");
    env.set("WEB_URL", "https://feedback.example.org");
    env.set("MAIL_FROM", "Feedback <hello@example.org>");

    let first = AppConfig::from_env().unwrap();
    let second = AppConfig::from_env().unwrap();

    assert_eq!(first.environment, Environment::Development);
    assert!(first.secret_key.len() >= 32);
    assert_ne!(first.secret_key, second.secret_key);
    assert_eq!(first.sender_address(), "Feedback <hello@example.org>");
    assert_eq!(first.web_host(), "feedback.example.org");
}

#[test]
#[serial]
fn invalid_values_are_reported() {
    let mut env = EnvGuard::clean();
    env.set("ENVIRONMENT", "staging");
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::InvalidEnvironment(_))
    ));

    env.set("ENVIRONMENT", "test");
    env.set("WEB_URL", "not a url");
    assert!(matches!(AppConfig::from_env(), Err(ConfigError::InvalidWebUrl(_))));

    env.set("WEB_URL", "https://feedback.example.org");
    env.set("BIND_ADDRESS", "nowhere");
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::InvalidBindAddress(_))
    ));
}

#[test]
#[serial]
fn debug_output_redacts_secret() {
    let mut env = EnvGuard::clean();
    env.set("ENVIRONMENT", "test");
    env.set("SECRET_KEY", "very-private-signing-key-material-123");

    let config = AppConfig::from_env().unwrap();
    let printed = format!("{:?}", config);

    assert!(!printed.contains("very-private"));
    assert!(printed.contains("<redacted>"));
}
