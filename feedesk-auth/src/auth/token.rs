//! Signed session tokens (HS256 JWT)
//!
//! A token is a stateless assertion of `{user_id, email, role}` that edge
//! code can check without a database round trip. It is not proof of an
//! active session: sign-out deletes the session row and leaves the token
//! cryptographically valid until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

use super::types::{JwtClaims, PublicUser};

/// Issues and validates session tokens
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign claims for `user`, issued at `now`
    pub fn sign(&self, user: &PublicUser, now: DateTime<Utc>) -> Result<String> {
        let claims = JwtClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp() as usize,
            exp: (now + self.lifetime).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Validate signature and expiry. Any failure is `None`.
    pub fn verify(&self, token: &str) -> Option<JwtClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<JwtClaims>(token, &self.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(reason = %e, "Token rejected");
                None
            }
        }
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::Role;

    fn user() -> PublicUser {
        PublicUser {
            id: 42,
            email: "admin@example.com".into(),
            name: "Admin".into(),
            role: Role::Admin,
        }
    }

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-jwt-key-min-32-chars!!", Duration::days(7))
    }

    #[test]
    fn test_sign_and_verify() {
        let now = Utc::now();
        let token = signer().sign(&user(), now).unwrap();
        let claims = signer().verify(&token).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_same_second_tokens_differ() {
        let now = Utc::now();
        let a = signer().sign(&user(), now).unwrap();
        let b = signer().sign(&user(), now).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::days(8);
        let token = signer().sign(&user(), issued).unwrap();
        assert!(signer().verify(&token).is_none());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = signer().sign(&user(), Utc::now()).unwrap();
        let other = TokenSigner::new(b"another-secret-another-secret!!!", Duration::days(7));
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_tampered_and_malformed_rejected() {
        let token = signer().sign(&user(), Utc::now()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        // swap in a payload signed for nobody
        parts[1] = "eyJzdWIiOiIxIiwiZW1haWwiOiJ4Iiwicm9sZSI6ImFkbWluIiwiZXhwIjo5OTk5OTk5OTk5LCJpYXQiOjAsImp0aSI6IngifQ";
        assert!(signer().verify(&parts.join(".")).is_none());
        assert!(signer().verify("invalid.token.here").is_none());
        assert!(signer().verify("").is_none());
    }
}
