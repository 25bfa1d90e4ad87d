//! Configuration loading and representation.

use std::net::SocketAddr;

use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "TIMBERLINE_BIND_ADDR";
pub const JWT_SECRET_VAR: &str = "TIMBERLINE_JWT_SECRET";
pub const ACCEPT_RETRIES_VAR: &str = "TIMBERLINE_ACCEPT_RETRIES";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEV_JWT_SECRET: &str = "timberline-dev-secret";
pub const DEFAULT_ACCEPT_RETRIES: u32 = 3;
const MAX_ACCEPT_RETRIES: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is invalid: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Commit attempts for optimistic workflows before reporting a conflict.
    pub accept_retries: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = non_blank(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse().map_err(|e| ConfigError::Invalid {
            key: BIND_ADDR_VAR,
            message: format!("{bind_raw:?}: {e}"),
        })?;

        let jwt_secret = match non_blank(JWT_SECRET_VAR) {
            Some(secret) => secret,
            None => {
                tracing::warn!("{JWT_SECRET_VAR} not set; using the development signing secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let accept_retries = match non_blank(ACCEPT_RETRIES_VAR) {
            None => DEFAULT_ACCEPT_RETRIES,
            Some(raw) => {
                let n: u32 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                    key: ACCEPT_RETRIES_VAR,
                    message: format!("{raw:?}: {e}"),
                })?;
                if n == 0 || n > MAX_ACCEPT_RETRIES {
                    return Err(ConfigError::Invalid {
                        key: ACCEPT_RETRIES_VAR,
                        message: format!("must be between 1 and {MAX_ACCEPT_RETRIES}, got {n}"),
                    });
                }
                n
            }
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            accept_retries,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            accept_retries: DEFAULT_ACCEPT_RETRIES,
        }
    }
}
