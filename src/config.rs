// src/config.rs

use std::env;

/// Server configuration, read from environment variables (a `.env` file is
/// loaded first when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string. Price columns must be NUMERIC so they map
    /// onto `bigdecimal::BigDecimal`.
    pub database_url: String,
    /// Secret shared with the identity provider to verify HS256 tokens.
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let config = AppConfig {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET".to_string()));
        }

        Ok(config)
    }
}
