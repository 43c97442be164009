//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `EVALUATION_CYCLES`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use evaluation_cycles::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Automation every {:?}", config.automation.poll_interval());
//! ```

mod automation;
mod database;
mod error;
mod runtime;

pub use automation::AutomationConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use runtime::{Environment, LogFormat, RuntimeConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// PostgreSQL store; absent means in-memory
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Automation scheduler and activation defaults
    #[serde(default)]
    pub automation: AutomationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `EVALUATION_CYCLES` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `EVALUATION_CYCLES__DATABASE__URL=...` -> `database.url = ...`
    /// - `EVALUATION_CYCLES__AUTOMATION__POLL_INTERVAL_SECS=30` -> `automation.poll_interval_secs = 30`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("EVALUATION_CYCLES")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.runtime.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.automation.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "EVALUATION_CYCLES__RUNTIME__ENVIRONMENT",
        "EVALUATION_CYCLES__RUNTIME__LOG_FORMAT",
        "EVALUATION_CYCLES__DATABASE__URL",
        "EVALUATION_CYCLES__DATABASE__RUN_MIGRATIONS",
        "EVALUATION_CYCLES__AUTOMATION__POLL_INTERVAL_SECS",
        "EVALUATION_CYCLES__AUTOMATION__ENABLED",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.database.is_none());
        assert!(config.automation.enabled);
        assert_eq!(config.automation.poll_interval_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EVALUATION_CYCLES__DATABASE__URL", "postgresql://test@localhost/cycles");
        env::set_var("EVALUATION_CYCLES__DATABASE__RUN_MIGRATIONS", "true");
        env::set_var("EVALUATION_CYCLES__AUTOMATION__POLL_INTERVAL_SECS", "15");
        env::set_var("EVALUATION_CYCLES__RUNTIME__LOG_FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let database = config.database.clone().unwrap();
        assert_eq!(database.url, "postgresql://test@localhost/cycles");
        assert!(database.run_migrations);
        assert_eq!(config.automation.poll_interval_secs, 15);
        assert_eq!(config.runtime.log_format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EVALUATION_CYCLES__RUNTIME__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_validate_rejects_bad_section() {
        let config = AppConfig {
            automation: AutomationConfig {
                poll_interval_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPollInterval));
    }
}
