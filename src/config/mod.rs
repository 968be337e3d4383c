pub mod app;

pub use app::{AppConfig, ConfigError, Environment};
