//! # Server Configuration
//!
//! Read once at startup from the process environment. A `.env` file in the working
//! directory is loaded first if present.
//!
//! | Variable      | Default       | Meaning                                     |
//! |---------------|---------------|---------------------------------------------|
//! | `HOST`        | `0.0.0.0`     | Interface to bind                           |
//! | `PORT`        | `4000`        | TCP port                                    |
//! | `RPC_PREFIX`  | `/trpc`       | URL prefix procedures are mounted under     |
//! | `APP_ENV`     | `production`  | `development` or `production`               |
//! | `SEED_USERS`  | `true`        | Create the demo users at startup            |

use std::env;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Internal error details are only sent to callers in development.
    pub fn expose_internal_errors(self) -> bool {
        self == Self::Development
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub prefix: String,
    pub environment: Environment,
    pub seed_users: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            prefix: "/trpc".to_string(),
            environment: Environment::Production,
            seed_users: true,
        }
    }
}

impl ServerConfig {
    /// Loads `.env` (if any) and then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        Self::from_vars(env::vars())
    }

    /// Builds a configuration from explicit key/value pairs. Unknown keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            config.apply_var(key.as_ref(), value.as_ref().trim())?;
        }
        Ok(config)
    }

    fn apply_var(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "HOST" => {
                if value.is_empty() {
                    return Err(ConfigError::invalid(key, "must not be empty"));
                }
                self.host = value.to_string();
            }
            "PORT" => {
                self.port = value
                    .parse()
                    .map_err(|_| ConfigError::invalid(key, "expected a port number"))?;
            }
            "RPC_PREFIX" => self.prefix = normalize_prefix(value),
            "APP_ENV" => {
                self.environment = match value.to_lowercase().as_str() {
                    "development" | "dev" => Environment::Development,
                    "production" | "prod" => Environment::Production,
                    _ => {
                        return Err(ConfigError::invalid(
                            key,
                            "expected development or production",
                        ))
                    }
                };
            }
            "SEED_USERS" => {
                self.seed_users =
                    parse_bool(value).ok_or_else(|| ConfigError::invalid(key, "expected boolean"))?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::invalid("HOST", format!("cannot bind to {}", self.host)))
    }
}

/// Leading slash, no trailing slash; an empty prefix mounts at the root.
fn normalize_prefix(value: &str) -> String {
    let trimmed = value.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
