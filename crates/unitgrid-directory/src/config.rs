//! Directory configuration
//!
//! Read from the environment at startup:
//!
//! - `UNITGRID_PORT`: listen port (default 8666)
//! - `UNITGRID_TOKEN_SECRET`: HMAC secret for unit tokens (required)
//! - `UNITGRID_TOKEN_TTL_SECS`: token lifetime in seconds (default 86400, at most 10 years)
//! - `UNITGRID_KEY_BINDING`: `none` or `fingerprint` (default none)
//! - `UNITGRID_DATABASE_URL`: PostgreSQL URL (only with the `postgres` feature)

use std::collections::HashMap;
use thiserror::Error;
use unitgrid_core::token::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};

use crate::core::KeyBinding;

pub const DEFAULT_PORT: u16 = 8666;

/// Error raised while loading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Directory server configuration
#[derive(Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub port: u16,
    pub token_secret: String,
    pub token_ttl_secs: i64,
    pub key_binding: KeyBinding,
    pub database_url: Option<String>,
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("port", &self.port)
            .field("token_secret", &"[redacted]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("key_binding", &self.key_binding)
            .field("database_url", &self.database_url.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl DirectoryConfig {
    /// Load configuration from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Load configuration from an explicit variable map
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(&vars, name);

        let port = match get("UNITGRID_PORT") {
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "UNITGRID_PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let token_secret = get("UNITGRID_TOKEN_SECRET")
            .ok_or(ConfigError::Missing("UNITGRID_TOKEN_SECRET"))?
            .to_string();

        let token_ttl_secs = match get("UNITGRID_TOKEN_TTL_SECS") {
            Some(v) => {
                let ttl = v.parse::<i64>().map_err(|e| {
                    ConfigError::Invalid {
                        name: "UNITGRID_TOKEN_TTL_SECS",
                        reason: e.to_string(),
                    }
                })?;
                if ttl <= 0 {
                    return Err(ConfigError::Invalid {
                        name: "UNITGRID_TOKEN_TTL_SECS",
                        reason: "must be positive".into(),
                    });
                }
                if ttl > MAX_TOKEN_TTL_SECS {
                    return Err(ConfigError::Invalid {
                        name: "UNITGRID_TOKEN_TTL_SECS",
                        reason: format!("must be at most {}", MAX_TOKEN_TTL_SECS),
                    });
                }
                ttl
            }
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let key_binding = match get("UNITGRID_KEY_BINDING") {
            Some(v) => v.parse::<KeyBinding>().map_err(|reason| ConfigError::Invalid {
                name: "UNITGRID_KEY_BINDING",
                reason,
            })?,
            None => KeyBinding::None,
        };

        Ok(Self {
            port,
            token_secret,
            token_ttl_secs,
            key_binding,
            database_url: get("UNITGRID_DATABASE_URL").map(String::from),
        })
    }
}

fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}
