//! Server settings on top of [`AuthConfig`](feedesk_auth::AuthConfig)

use std::net::SocketAddr;
use std::time::Duration;

use feedesk_auth::{AuthError, Result};

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_REAP_SECS: u64 = 3_600;

/// Credentials for the account created on first start
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `FEEDESK_BIND`
    pub bind: SocketAddr,
    /// `FEEDESK_BOOTSTRAP_ADMIN_EMAIL` + `FEEDESK_BOOTSTRAP_ADMIN_PASSWORD`
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// `FEEDESK_SESSION_REAP_SECS`; `None` when set to 0
    pub reap_interval: Option<Duration>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("FEEDESK_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let bind = bind
            .parse()
            .map_err(|_| AuthError::Config(format!("FEEDESK_BIND: not a socket address: {bind}")))?;

        let bootstrap_admin = match (
            lookup("FEEDESK_BOOTSTRAP_ADMIN_EMAIL"),
            lookup("FEEDESK_BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => {
                return Err(AuthError::Config(
                    "FEEDESK_BOOTSTRAP_ADMIN_EMAIL and FEEDESK_BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .into(),
                ))
            }
        };

        let reap_secs = match lookup("FEEDESK_SESSION_REAP_SECS") {
            Some(v) => v.parse().map_err(|_| {
                AuthError::Config(format!("FEEDESK_SESSION_REAP_SECS: not a number: {v}"))
            })?,
            None => DEFAULT_REAP_SECS,
        };
        let reap_interval = (reap_secs > 0).then(|| Duration::from_secs(reap_secs));

        Ok(Self { bind, bootstrap_admin, reap_interval })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind.port(), 3000);
        assert!(config.bootstrap_admin.is_none());
        assert_eq!(config.reap_interval, Some(Duration::from_secs(3_600)));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("FEEDESK_BIND", "127.0.0.1:8080"),
            ("FEEDESK_BOOTSTRAP_ADMIN_EMAIL", "admin@school.test"),
            ("FEEDESK_BOOTSTRAP_ADMIN_PASSWORD", "changeme"),
            ("FEEDESK_SESSION_REAP_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(config.bootstrap_admin.unwrap().email, "admin@school.test");
        assert!(config.reap_interval.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(ServerConfig::from_lookup(lookup(&[("FEEDESK_BIND", "nowhere")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[(
            "FEEDESK_BOOTSTRAP_ADMIN_EMAIL",
            "admin@school.test"
        )]))
        .is_err());
    }

    #[test]
    fn test_password_not_in_debug() {
        let admin = BootstrapAdmin { email: "a@b.c".into(), password: "hunter2".into() };
        assert!(!format!("{admin:?}").contains("hunter2"));
    }
}
