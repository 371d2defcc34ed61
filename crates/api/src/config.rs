use std::time::Duration;

use studio_core::attendance::WorkSchedule;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Office hours used to classify web check-ins.
    pub schedule: WorkSchedule,
    /// Timeout for manual biometric machine syncs.
    pub device_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DEVICE_TIMEOUT_SECS`  | `10`                       |
    ///
    /// The work schedule variables are shared with the worker, see
    /// [`studio_worker::config::schedule_from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let device_timeout_secs: u64 = std::env::var("DEVICE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("DEVICE_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env()
            .unwrap_or_else(|e| panic!("Invalid JWT configuration: {e}"));

        let schedule = studio_worker::config::schedule_from_env()
            .unwrap_or_else(|e| panic!("Invalid work schedule configuration: {e:#}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            schedule,
            device_timeout: Duration::from_secs(device_timeout_secs),
        }
    }
}
