use std::{env, net::SocketAddr};

use thiserror::Error;

use super::{env_or, server_bind_address, DEFAULT_DATABASE_URL, DEFAULT_IDENTITY_PROVIDER_URL};

/// Application runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }

    /// Returns the canonical name used for logging/metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

/// Runtime configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub database_url: String,
    pub identity_provider_url: String,
}

impl AppConfig {
    /// Constructs the configuration by reading and validating environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_value = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let environment = Environment::from_str(&env_value)?;
        let bind_addr = server_bind_address().map_err(ConfigError::BindAddress)?;
        let database_url = env_or("DATABASE_URL", DEFAULT_DATABASE_URL);
        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::UnsupportedDatabase(database_url));
        }

        let mut identity_provider_url =
            env_or("IDENTITY_PROVIDER_URL", DEFAULT_IDENTITY_PROVIDER_URL);
        // Relative joins drop the last path segment unless the base ends with a slash.
        if !identity_provider_url.ends_with('/') {
            identity_provider_url.push('/');
        }

        Ok(Self {
            bind_addr,
            environment,
            database_url,
            identity_provider_url,
        })
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APP_ENV must be one of 'development', 'production', or 'test' (got {0})")]
    InvalidEnvironment(String),
    #[error("invalid APP_BIND_ADDR value: {0}")]
    BindAddress(#[source] std::net::AddrParseError),
    #[error("DATABASE_URL must use the sqlite: scheme (got {0})")]
    UnsupportedDatabase(String),
}
