//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use wallet_store::db::{ConfigError, DatabaseConfig};

/// Complete CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Print JSON on a single line instead of pretty-printed
    pub compact_output: bool,
}

impl AdminConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `DATABASE_URL` is missing (and not overridden) or if a
    /// pool variable is invalid
    pub fn from_env(database_url_override: Option<String>) -> Result<Self, ConfigError> {
        Self::from_lookup(database_url_override, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(database_url_override: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig::from_lookup(|key| {
            if key == "DATABASE_URL" && database_url_override.is_some() {
                database_url_override.clone()
            } else {
                lookup(key)
            }
        })?;

        let compact_output = lookup("WALLET_ADMIN_COMPACT")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(AdminConfig {
            database,
            compact_output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_override_wins_over_env() {
        let config = AdminConfig::from_lookup(
            Some("postgres://cli@localhost/cli_db".to_string()),
            env_of(&[("DATABASE_URL", "postgres://env@localhost/env_db")]),
        )
        .unwrap();

        assert_eq!(
            config.database.database_url,
            "postgres://cli@localhost/cli_db"
        );
        assert!(!config.compact_output);
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let err = AdminConfig::from_lookup(None, env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn test_compact_flag() {
        let config = AdminConfig::from_lookup(
            None,
            env_of(&[
                ("DATABASE_URL", "postgres://localhost/db"),
                ("WALLET_ADMIN_COMPACT", "TRUE"),
            ]),
        )
        .unwrap();
        assert!(config.compact_output);
    }
}
