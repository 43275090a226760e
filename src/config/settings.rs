//! Runtime settings read from the process environment.

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "campus_registry=info,tower_http=info";

#[derive(Clone, Debug)]
pub struct Settings {
    /// PostgreSQL URL. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Settings {
    /// Read settings from the process environment. Load `.env` first if wanted.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw.parse().map_err(|e| ConfigError::Invalid {
            var: "BIND_ADDR",
            reason: format!("{}: {}", bind_raw, e),
        })?;

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse().map_err(|e| ConfigError::Invalid {
                var: "DATABASE_MAX_CONNECTIONS",
                reason: format!("{}: {}", v, e),
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let body_limit_bytes = match get("BODY_LIMIT_BYTES") {
            Some(v) => v.parse().map_err(|e| ConfigError::Invalid {
                var: "BODY_LIMIT_BYTES",
                reason: format!("{}: {}", v, e),
            })?,
            None => DEFAULT_BODY_LIMIT_BYTES,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Settings {
            database_url: get("DATABASE_URL"),
            max_connections,
            bind_addr,
            allowed_origins,
            body_limit_bytes,
        })
    }
}
