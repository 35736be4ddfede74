//! # FeeDesk Server
//!
//! Axum front end for [`feedesk_auth`]. Owns the transport concerns the auth
//! core leaves out: reading the `session` cookie, writing `Set-Cookie`,
//! mapping [`AuthError`](feedesk_auth::AuthError) to status codes, and the
//! edge filter that runs in front of every route.
//!
//! ```text
//! request ─► TraceLayer ─► edge_filter ─► handler ─► SessionManager::require
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod middleware;
pub mod routes;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{field, info_span, Span};

use feedesk_auth::{EdgeFilter, SessionManager};

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared state for all axum handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub manager: SessionManager,
    pub edge: EdgeFilter,
}

impl AppState {
    pub fn new(manager: SessionManager) -> Self {
        let edge = EdgeFilter::new(manager.signer().clone());
        Self { manager, edge }
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/me", get(routes::auth::me))
        .route(
            "/api/admin/users",
            get(routes::admin::list_users).post(routes::admin::create_user),
        )
        .route(
            "/api/admin/users/:id",
            put(routes::admin::update_user).delete(routes::admin::deactivate_user),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::edge_filter,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Span wrapping one request. Handlers fill in `operation`, so anything
/// logged while the request is answered (including the 500 log) names it.
pub fn request_span<B>(request: &Request<B>) -> Span {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or_else(|| request.uri().path());
    info_span!(
        "request",
        method = %request.method(),
        route = %route,
        operation = field::Empty,
    )
}

/// Name the operation the current request performs
pub(crate) fn record_operation(name: &'static str) {
    Span::current().record("operation", name);
}
