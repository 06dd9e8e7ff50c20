//! Configuration management for the DailyUse sync server

use axum::http::HeaderName;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long browsers may cache CORS preflight responses
    pub cors_max_age_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Header carrying the authenticated owner id, set by the auth layer in front of us
    pub owner_header: HeaderName,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_max_age_secs: 86400,
            },
            database: DatabaseConfig {
                url: "sqlite:./dailyuse.db".to_string(),
                max_connections: 5,
            },
            identity: IdentityConfig {
                owner_header: HeaderName::from_static("x-user-id"),
            },
        }
    }
}

impl ServerConfig {
    pub fn cors_max_age(&self) -> Duration {
        Duration::from_secs(self.cors_max_age_secs)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
                cors_max_age_secs: parse_var("CORS_MAX_AGE_SECS", defaults.server.cors_max_age_secs)?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_var(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                )?,
            },
            identity: IdentityConfig {
                owner_header: match env::var("OWNER_HEADER") {
                    Ok(value) => parse_header_name("OWNER_HEADER", value)?,
                    Err(_) => defaults.identity.owner_header,
                },
            },
        })
    }
}

/// Read and parse an optional environment variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

/// Validate a header name taken from the environment.
fn parse_header_name(name: &'static str, value: String) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(value.trim().as_bytes()).map_err(|_| ConfigError::Invalid { name, value })
}
