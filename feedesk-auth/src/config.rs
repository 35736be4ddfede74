//! Configuration for the FeeDesk auth core

use std::path::{Path, PathBuf};

use chrono::Duration;
use tracing::warn;

use crate::error::{AuthError, Result};

const DEV_JWT_SECRET: &str = "feedesk-development-secret-change-me";
/// Shortest HMAC key accepted in production
const MIN_JWT_SECRET_LEN: usize = 32;

/// Auth core configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// HMAC secret for session token signing
    pub jwt_secret: String,

    /// Session lifetime in days (cookie, token and session row share it)
    pub session_duration_days: u32,

    /// Production mode: session cookies carry the `Secure` attribute
    pub production: bool,

    /// Maximum pooled SQLite connections
    pub pool_size: u32,

    /// Milliseconds a connection waits on a locked database before failing
    pub busy_timeout_ms: u64,

    /// Argon2 memory cost in KiB
    pub password_memory_kib: u32,

    /// Argon2 iteration count
    pub password_iterations: u32,

    /// Argon2 lanes
    pub password_parallelism: u32,
}

impl AuthConfig {
    /// Create config with sensible defaults
    ///
    /// The JWT secret falls back to `FEEDESK_JWT_SECRET` and then to a
    /// development-only constant.
    pub fn new(database_path: impl AsRef<Path>) -> Self {
        Self {
            database_path: database_path.as_ref().to_path_buf(),
            jwt_secret: std::env::var("FEEDESK_JWT_SECRET")
                .unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            session_duration_days: 7,
            production: false,
            pool_size: 8,
            busy_timeout_ms: 5_000,
            password_memory_kib: argon2::Params::DEFAULT_M_COST,
            password_iterations: argon2::Params::DEFAULT_T_COST,
            password_parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }

    /// Load configuration from `FEEDESK_*` environment variables
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `FEEDESK_DATABASE_PATH` | `feedesk.db` |
    /// | `FEEDESK_JWT_SECRET` | development constant (rejected in production) |
    /// | `FEEDESK_ENV` | anything but `production` is development |
    /// | `FEEDESK_SESSION_DAYS` | 7 |
    /// | `FEEDESK_POOL_SIZE` | 8 |
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("FEEDESK_DATABASE_PATH").unwrap_or_else(|_| "feedesk.db".into());
        let production = std::env::var("FEEDESK_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let mut config = Self::new(path).with_production(production);

        if let Ok(days) = std::env::var("FEEDESK_SESSION_DAYS") {
            let days = days
                .parse()
                .map_err(|_| AuthError::Config(format!("FEEDESK_SESSION_DAYS: not a number: {days}")))?;
            config = config.with_session_duration_days(days);
        }
        if let Ok(size) = std::env::var("FEEDESK_POOL_SIZE") {
            let size = size
                .parse()
                .map_err(|_| AuthError::Config(format!("FEEDESK_POOL_SIZE: not a number: {size}")))?;
            config = config.with_pool_size(size);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that must never run
    pub fn validate(&self) -> Result<()> {
        if self.session_duration_days == 0 {
            return Err(AuthError::Config("session duration must be at least one day".into()));
        }
        if self.pool_size == 0 {
            return Err(AuthError::Config("pool size must be positive".into()));
        }
        if self.jwt_secret == DEV_JWT_SECRET {
            if self.production {
                return Err(AuthError::Config(
                    "FEEDESK_JWT_SECRET must be set in production".into(),
                ));
            }
            warn!("Using the development JWT secret; set FEEDESK_JWT_SECRET");
        } else if self.production && self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "FEEDESK_JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes in production"
            )));
        }
        Ok(())
    }

    /// Override JWT secret
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    /// Override session lifetime
    pub fn with_session_duration_days(mut self, days: u32) -> Self {
        self.session_duration_days = days;
        self
    }

    /// Toggle production mode
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Override pool size
    pub fn with_pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    /// Override the Argon2 work factor
    pub fn with_password_cost(mut self, memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        self.password_memory_kib = memory_kib;
        self.password_iterations = iterations;
        self.password_parallelism = parallelism;
        self
    }

    /// Session lifetime as a duration
    pub fn session_duration(&self) -> Duration {
        Duration::days(i64::from(self.session_duration_days))
    }
}
