//! # FeeDesk Auth
//!
//! Authentication and authorization core for the FeeDesk school fee
//! management system: password hashing, signed session tokens, a revocable
//! SQLite session store and a role capability table.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │               feedesk-auth                │
//! ├─────────────────────┬─────────────────────┤
//! │   SessionManager    │  EdgeFilter / guard │
//! │ (sign-in, sign-out, │  (capability table, │
//! │   current user)     │   landing redirect) │
//! ├──────────┬──────────┼──────────┬──────────┤
//! │ Password │  Token   │ Session  │   User   │
//! │  Hasher  │  Signer  │  Store   │  Store   │
//! ├──────────┴──────────┴──────────┴──────────┤
//! │        Database (r2d2 + rusqlite)         │
//! └───────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use feedesk_auth::{AuthConfig, Database, Operation, SessionManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthConfig::from_env()?;
//!     let db = Database::open(&config).await?;
//!     let manager = SessionManager::new(db.clone(), &config)?;
//!
//!     let signed_in = manager.sign_in("accountant@example.com", "pw").await?;
//!     let user = manager
//!         .require(Some(&signed_in.token), Operation::IssueFeeVouchers)
//!         .await?;
//!     println!("{} may issue vouchers", user.name);
//!
//!     db.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **Generic failures**: unknown email, inactive account and wrong password
//!   are the same `InvalidCredentials`
//! - **Revocation**: sign-out deletes the session row; a still-valid token
//!   resolves to no user afterwards
//! - **Lazy expiry**: expired sessions are filtered in the lookup query
//! - **Fresh roles**: authorization uses the role stored on the user row,
//!   never the token claim
//! - **Railway Programming**: All operations return `Result<T, AuthError>`

pub mod auth;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod schema;
pub mod store;

// Re-exports for convenience
pub use auth::{
    authorize, Decision, DenyReason, EdgeAction, EdgeFilter, NewUser, Operation, PasswordHasher,
    PublicUser, Role, SessionCookie, SessionManager, SessionStore, SignIn, TokenSigner,
    UserRecord, UserStore, UserUpdate,
};
pub use config::AuthConfig;
pub use error::{AuthError, Result};
pub use maintenance::SessionReaper;
pub use store::Database;
