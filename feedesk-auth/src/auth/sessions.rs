//! SessionStore: persistent, revocable session records
//!
//! The authoritative answer to "is this token still signed in". Rows hold a
//! SHA-256 digest of the token; expiry and the owner's active flag are part of
//! the lookup predicate, so an expired row is indistinguishable from a
//! missing one.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::Result;
use crate::store::{from_unix, unix_now, Database};

use super::types::SessionUser;

/// Digest stored in place of the token
pub(crate) fn token_hash(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a session. Users may hold any number of sessions.
    pub async fn create(&self, user_id: i64, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let hash = token_hash(token);
        let expires = expires_at.timestamp();
        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO user_sessions (user_id, token_hash, created_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![user_id, hash, unix_now(), expires],
                )?;
                Ok(())
            })
            .await?;
        debug!(user_id, "Session stored");
        Ok(())
    }

    /// Resolve a token to its user. Expired sessions and inactive users are
    /// `None`.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<SessionUser>> {
        let hash = token_hash(token);
        self.db
            .run(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT s.user_id, u.email, u.name, u.role, s.expires_at
                         FROM user_sessions s
                         JOIN users u ON s.user_id = u.id
                         WHERE s.token_hash = ?1 AND s.expires_at > ?2 AND u.is_active = 1",
                        params![hash, unix_now()],
                        |row| {
                            Ok(SessionUser {
                                user_id: row.get(0)?,
                                email: row.get(1)?,
                                name: row.get(2)?,
                                role: row.get(3)?,
                                expires_at: from_unix(row.get(4)?),
                            })
                        },
                    )
                    .optional()?)
            })
            .await
    }

    /// Delete the session for `token`. Returns whether a row was removed;
    /// unknown tokens are not an error.
    pub async fn delete_by_token(&self, token: &str) -> Result<bool> {
        let hash = token_hash(token);
        let deleted = self
            .db
            .run(move |conn| {
                Ok(conn.execute("DELETE FROM user_sessions WHERE token_hash = ?1", params![hash])?)
            })
            .await?;
        Ok(deleted > 0)
    }

    /// Delete every session of one user
    pub async fn delete_for_user(&self, user_id: i64) -> Result<usize> {
        let deleted = self
            .db
            .run(move |conn| {
                Ok(conn.execute("DELETE FROM user_sessions WHERE user_id = ?1", params![user_id])?)
            })
            .await?;
        if deleted > 0 {
            info!(user_id, deleted, "Sessions revoked");
        }
        Ok(deleted)
    }

    /// Physically remove expired rows
    pub async fn purge_expired(&self) -> Result<usize> {
        self.db
            .run(|conn| {
                Ok(conn.execute(
                    "DELETE FROM user_sessions WHERE expires_at <= ?1",
                    params![unix_now()],
                )?)
            })
            .await
    }

    /// Rows currently stored for `user_id`, expired or not
    pub async fn count_for_user(&self, user_id: i64) -> Result<usize> {
        self.db
            .run(move |conn| {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM user_sessions WHERE user_id = ?1",
                    params![user_id],
                    |row| row.get(0),
                )?;
                Ok(n as usize)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hash_is_stable_hex() {
        let a = token_hash("abc");
        assert_eq!(a, token_hash("abc"));
        assert_ne!(a, token_hash("abd"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
