use std::env;
use std::time::Duration;

use crate::error::StartupError;

const DEFAULT_DATABASE_NAME: &str = "taskhub";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_ATTEMPTS: u32 = 1;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_JWT_TTL_HOURS: i64 = 24;

/// Settings for the Connection Initializer.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub database_name: String,
    /// Budget for each bounded step (client construction, ping).
    pub connect_timeout: Duration,
    pub connect_attempts: u32,
    /// Delay before the second attempt; doubles on every further attempt.
    pub retry_backoff: Duration,
}

pub struct Config {
    pub database: DatabaseConfig,
    pub server_port: u16,
    pub server_host: String,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `MONGODB_URI` and `JWT_SECRET` are required. `SERVER_PORT` falls back to
    /// `PORT` before the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig {
            uri: required(&lookup, "MONGODB_URI")?,
            database_name: lookup("MONGODB_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            connect_timeout: Duration::from_secs(parsed(
                &lookup,
                "MONGODB_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
            connect_attempts: parsed(&lookup, "MONGODB_CONNECT_ATTEMPTS", DEFAULT_CONNECT_ATTEMPTS)?
                .max(1),
            retry_backoff: Duration::from_millis(parsed(
                &lookup,
                "MONGODB_RETRY_BACKOFF_MS",
                DEFAULT_RETRY_BACKOFF_MS,
            )?),
        };

        let port_key = if lookup("SERVER_PORT").is_some() {
            "SERVER_PORT"
        } else {
            "PORT"
        };
        let server_port = parsed(&lookup, port_key, DEFAULT_SERVER_PORT)?;

        Ok(Self {
            database,
            server_port,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            cors_origin: lookup("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            jwt_ttl_hours: parsed(&lookup, "JWT_TTL_HOURS", DEFAULT_JWT_TTL_HOURS)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server_host.clone(), self.server_port)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| StartupError::Config(format!("{} must be set", key)))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, StartupError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| StartupError::Config(format!("{} must be a number, got {:?}", key, raw))),
        None => Ok(default),
    }
}
