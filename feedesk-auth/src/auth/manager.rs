//! SessionManager: sign-in, sign-out and current-user resolution
//!
//! # Usage
//!
//! ```rust,no_run
//! use feedesk_auth::{AuthConfig, Database, Operation, SessionManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthConfig::new("/var/lib/feedesk/feedesk.db")
//!         .with_jwt_secret("my-production-secret");
//!     let db = Database::open(&config).await?;
//!     let manager = SessionManager::new(db, &config)?;
//!
//!     // Sign in → cookie directive for the transport
//!     let signed_in = manager.sign_in("admin@example.com", "correct-pw").await?;
//!     let set_cookie = signed_in.cookie.to_header_value();
//!
//!     // On each request
//!     let user = manager.require(Some(&signed_in.token), Operation::ManageUsers).await?;
//!     assert_eq!(user.email, "admin@example.com");
//!
//!     // Revoke
//!     manager.sign_out(Some(&signed_in.token)).await?;
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::store::Database;

use super::cookie::SessionCookie;
use super::guard::{self, Operation};
use super::password::PasswordHasher;
use super::sessions::SessionStore;
use super::token::TokenSigner;
use super::types::PublicUser;
use super::users::UserStore;

/// Result of a successful sign-in
#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: PublicUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub cookie: SessionCookie,
    pub redirect_path: &'static str,
}

/// Orchestrates the session lifecycle
///
/// Cheap to clone; every clone shares the same database pool.
#[derive(Clone, Debug)]
pub struct SessionManager {
    users: UserStore,
    sessions: SessionStore,
    signer: TokenSigner,
    hasher: PasswordHasher,
    secure_cookies: bool,
    /// Verified against when the email is unknown, so every failed sign-in
    /// pays for one hash verification
    dummy_hash: String,
}

impl SessionManager {
    pub fn new(db: Database, config: &AuthConfig) -> Result<Self> {
        let hasher = PasswordHasher::from_config(config)?;
        let dummy_hash = hasher.hash("feedesk-dummy-password")?;

        Ok(Self {
            users: UserStore::new(db.clone(), hasher.clone()),
            sessions: SessionStore::new(db),
            signer: TokenSigner::new(config.jwt_secret.as_bytes(), config.session_duration()),
            hasher,
            secure_cookies: config.production,
            dummy_hash,
        })
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Verify credentials and open a new session
    ///
    /// Unknown email, inactive account and wrong password all fail with the
    /// same [`AuthError::InvalidCredentials`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let stored = self.users.find_active_by_email(email).await?;
        let hash = stored
            .as_ref()
            .map(|c| c.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());

        let valid = self.hasher.verify_blocking(password.to_string(), hash).await?;

        let user = match stored {
            Some(creds) if valid => creds.user.to_public(),
            _ => {
                debug!("Sign-in rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        let expires_at = now + self.signer.lifetime();
        let token = self.signer.sign(&user, now)?;
        self.sessions.create(user.id, &token, expires_at).await?;

        let cookie = SessionCookie::issue(token.clone(), expires_at, self.signer.lifetime(), self.secure_cookies);
        info!(user_id = user.id, role = %user.role, "Signed in");

        Ok(SignIn {
            redirect_path: user.role.landing_path(),
            user,
            token,
            expires_at,
            cookie,
        })
    }

    /// Revoke the session behind `token`
    ///
    /// Returns the clearing cookie when a token was presented; no token is a
    /// no-op, and an unknown or already revoked token is not an error.
    pub async fn sign_out(&self, token: Option<&str>) -> Result<Option<SessionCookie>> {
        let Some(token) = token else {
            return Ok(None);
        };
        if self.sessions.delete_by_token(token).await? {
            info!("Signed out");
        } else {
            debug!("Sign-out for unknown session");
        }
        Ok(Some(SessionCookie::clear(self.secure_cookies)))
    }

    /// Resolve the user behind a session token
    ///
    /// Missing token, unknown or expired session and deactivated user all
    /// resolve to `None`.
    pub async fn current_user(&self, token: Option<&str>) -> Result<Option<PublicUser>> {
        let Some(token) = token else {
            return Ok(None);
        };
        Ok(self.sessions.find_by_token(token).await?.map(PublicUser::from))
    }

    /// `current_user` followed by the route guard
    pub async fn require(&self, token: Option<&str>, operation: Operation) -> Result<PublicUser> {
        let user = self.current_user(token).await?;
        guard::require(user, operation)
    }
}
