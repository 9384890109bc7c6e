//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Posting engine configuration.
    #[serde(default)]
    pub posting: PostingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Posting engine configuration.
///
/// Controls the bounded retry applied when sequence allocation or account
/// locking hits contention. A retry re-runs the whole posting transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Maximum number of retries before surfacing a conflict to the caller.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Linear backoff between retries, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    25
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KITABU").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posting_config_defaults() {
        let posting = PostingConfig::default();
        assert_eq!(posting.max_retries, 3);
        assert_eq!(posting.retry_backoff_ms, 25);
    }

    #[test]
    fn test_env_layering_resolves_nested_keys() {
        // Same prefix and separator as `AppConfig::load`, fed from an
        // explicit map instead of the process environment.
        let env = config::Environment::with_prefix("KITABU")
            .separator("__")
            .source(Some(
                [
                    (
                        "KITABU__DATABASE__URL".to_string(),
                        "postgres://kitabu@localhost/kitabu_test".to_string(),
                    ),
                    ("KITABU__POSTING__MAX_RETRIES".to_string(), "5".to_string()),
                ]
                .into(),
            ));

        let loaded: AppConfig = config::Config::builder()
            .add_source(env)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(loaded.database.url, "postgres://kitabu@localhost/kitabu_test");
        assert_eq!(loaded.database.max_connections, 10);
        assert_eq!(loaded.posting.max_retries, 5);
        assert_eq!(loaded.posting.retry_backoff_ms, 25);
    }
}
