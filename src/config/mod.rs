//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `EVENT_NETWORKING` prefix, nested values separated by `__`. A `.env`
//! file is honoured in development.
//!
//! ```text
//! EVENT_NETWORKING__SERVER__PORT=8080
//! EVENT_NETWORKING__STORAGE__BACKEND=memory
//! EVENT_NETWORKING__STORAGE__SEED_FILE=./seed.yaml
//! EVENT_NETWORKING__DATABASE__URL=postgres://localhost/networking
//! ```

mod database;
mod error;
mod server;
mod storage;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, LogFormat, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

pub const ENV_PREFIX: &str = "EVENT_NETWORKING";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadError` if a value cannot be parsed into its
    /// expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation. Database settings are only checked when the
    /// PostgreSQL backend is selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        if self.storage.backend == StorageBackend::Postgres {
            self.database.validate()?;
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "EVENT_NETWORKING__SERVER__PORT",
        "EVENT_NETWORKING__SERVER__LOG_FORMAT",
        "EVENT_NETWORKING__STORAGE__BACKEND",
        "EVENT_NETWORKING__STORAGE__SEED_FILE",
        "EVENT_NETWORKING__DATABASE__URL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_memory_backend_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("EVENT_NETWORKING__SERVER__PORT", "9090");
        env::set_var("EVENT_NETWORKING__SERVER__LOG_FORMAT", "json");
        env::set_var("EVENT_NETWORKING__STORAGE__BACKEND", "memory");
        env::set_var("EVENT_NETWORKING__STORAGE__SEED_FILE", "/tmp/seed.yaml");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert!(config.storage.is_memory());
        assert!(config.storage.seed_file.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("EVENT_NETWORKING__STORAGE__BACKEND", "postgres");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_postgres_backend_with_url_validates() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("EVENT_NETWORKING__DATABASE__URL", "postgres://u@localhost/db");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_backend_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("EVENT_NETWORKING__STORAGE__BACKEND", "sqlite");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
