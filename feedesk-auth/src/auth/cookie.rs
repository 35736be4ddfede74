//! Session cookie directives
//!
//! The core does not own an HTTP stack; it hands the transport a
//! [`SessionCookie`] describing what to set or clear, and reads the token back
//! out of a raw `Cookie` header.

use chrono::{DateTime, Duration, Utc};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Set or clear directive for the `session` cookie
///
/// Always `HttpOnly`, `SameSite=Lax` and `Path=/`; `Secure` in production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    value: String,
    expires: DateTime<Utc>,
    max_age: Duration,
    secure: bool,
}

impl SessionCookie {
    /// Cookie carrying `token` until `expires`
    pub fn issue(token: impl Into<String>, expires: DateTime<Utc>, max_age: Duration, secure: bool) -> Self {
        Self {
            value: token.into(),
            expires,
            max_age,
            secure,
        }
    }

    /// Cookie that makes the browser drop the session
    pub fn clear(secure: bool) -> Self {
        Self {
            value: String::new(),
            expires: DateTime::UNIX_EPOCH,
            max_age: Duration::zero(),
            secure,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_removal(&self) -> bool {
        self.value.is_empty()
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        let mut out = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Expires={}; Max-Age={}",
            self.value,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.max_age.num_seconds().max(0),
        );
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }
}

/// Find a cookie by name in a `Cookie` request header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Session token from a `Cookie` request header
pub fn session_token(header: &str) -> Option<&str> {
    cookie_value(header, SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_issue_header() {
        let expires = Utc.with_ymd_and_hms(2026, 10, 23, 8, 30, 0).unwrap();
        let cookie = SessionCookie::issue("abc.def.ghi", expires, Duration::days(7), false);
        assert_eq!(
            cookie.to_header_value(),
            "session=abc.def.ghi; Path=/; HttpOnly; SameSite=Lax; \
             Expires=Fri, 23 Oct 2026 08:30:00 GMT; Max-Age=604800"
        );
    }

    #[test]
    fn test_secure_in_production() {
        let cookie = SessionCookie::issue("t", Utc::now(), Duration::days(7), true);
        assert!(cookie.to_header_value().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_header() {
        let cookie = SessionCookie::clear(false);
        assert!(cookie.is_removal());
        let header = cookie.to_header_value();
        assert!(header.starts_with("session=; "));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn test_session_token_parsing() {
        assert_eq!(session_token("session=abc"), Some("abc"));
        assert_eq!(session_token("theme=dark; session=a.b.c; role=admin"), Some("a.b.c"));
        assert_eq!(session_token("theme=dark"), None);
        assert_eq!(session_token("session="), None);
        assert_eq!(session_token("xsession=abc"), None);
        assert_eq!(session_token(""), None);
    }
}
