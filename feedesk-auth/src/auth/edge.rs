//! Edge request filter
//!
//! Runs before any handler and without touching the database. It only keeps
//! anonymous traffic away from protected paths and sends `/` to the caller's
//! landing page. Handlers still re-check every request against the session
//! store, so this layer never grants anything.
//!
//! The landing role is read from the verified session token. A plaintext
//! `role` cookie, if a client sends one, is ignored.

use super::token::TokenSigner;
use super::types::{landing_path_for, DEFAULT_LANDING_PATH};

/// Path the filter redirects anonymous page requests to
pub const LOGIN_PATH: &str = "/login";

const DEFAULT_PUBLIC_PREFIXES: [&str; 4] = [LOGIN_PATH, "/api/auth/login", "/api/auth/logout", "/health"];

/// What the transport should do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeAction {
    /// Hand the request to the router
    Continue,
    /// Anonymous page request
    RedirectToLogin,
    /// Anonymous API request
    Unauthorized,
    /// Send the caller elsewhere (landing page for `/`)
    Redirect(&'static str),
}

#[derive(Clone, Debug)]
pub struct EdgeFilter {
    signer: TokenSigner,
    public_prefixes: Vec<String>,
}

impl EdgeFilter {
    pub fn new(signer: TokenSigner) -> Self {
        Self {
            signer,
            public_prefixes: DEFAULT_PUBLIC_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Add a path prefix reachable without a session
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefixes.push(prefix.into());
        self
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn evaluate(&self, path: &str, session_token: Option<&str>) -> EdgeAction {
        if self.is_public(path) {
            return EdgeAction::Continue;
        }

        let Some(token) = session_token else {
            return if path.starts_with("/api/") {
                EdgeAction::Unauthorized
            } else {
                EdgeAction::RedirectToLogin
            };
        };

        if path == "/" {
            let landing = match self.signer.verify(token) {
                Some(claims) => landing_path_for(Some(claims.role.as_str())),
                None => DEFAULT_LANDING_PATH,
            };
            return EdgeAction::Redirect(landing);
        }

        EdgeAction::Continue
    }
}
