//! Authentication module: passwords, tokens, sessions and role checks
//!
//! Built on SQLite; every request re-reads the session and the user's current
//! role from the store.

pub mod cookie;
pub mod edge;
pub mod guard;
pub mod manager;
pub mod password;
pub mod sessions;
pub mod token;
pub mod types;
pub mod users;

pub use cookie::{session_token, SessionCookie, SESSION_COOKIE};
pub use edge::{EdgeAction, EdgeFilter, LOGIN_PATH};
pub use guard::{authorize, Decision, DenyReason, Operation};
pub use manager::{SessionManager, SignIn};
pub use password::PasswordHasher;
pub use sessions::SessionStore;
pub use token::TokenSigner;
pub use types::{JwtClaims, NewUser, ParentProfile, PublicUser, Role, UserRecord, UserSummary, UserUpdate};
pub use users::UserStore;
