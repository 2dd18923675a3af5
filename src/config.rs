//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use std::time::Duration;

use serde::Deserialize;

use crate::services::token_sweeper::DEFAULT_SWEEP_INTERVAL;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `ADMIN_SECRET` (required): shared secret expected in the `x-admin-secret` header
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 8080
/// - `DB_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `TOKEN_SWEEP_INTERVAL_SECS` (optional): expired token sweep period, defaults to 60
#[derive(Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub admin_secret: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_sweep_interval")]
    pub token_sweep_interval_secs: u64,
}

/// Error raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envy::Error),

    #[error("ADMIN_SECRET must not be empty")]
    EmptyAdminSecret,

    #[error("TOKEN_SWEEP_INTERVAL_SECS must be greater than zero")]
    ZeroSweepInterval,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    5
}

fn default_sweep_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL.as_secs()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL, ADMIN_SECRET)
    /// - Environment variable values cannot be parsed into expected types
    /// - The admin secret is empty or the sweep interval is zero
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_secret.is_empty() {
            return Err(ConfigError::EmptyAdminSecret);
        }
        if self.token_sweep_interval_secs == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.token_sweep_interval_secs)
    }
}

// Keeps the admin secret and connection string out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"<redacted>")
            .field("admin_secret", &"<redacted>")
            .field("server_port", &self.server_port)
            .field("db_max_connections", &self.db_max_connections)
            .field("token_sweep_interval_secs", &self.token_sweep_interval_secs)
            .finish()
    }
}
