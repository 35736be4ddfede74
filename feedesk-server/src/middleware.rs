//! Edge filter middleware

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use feedesk_auth::auth::LOGIN_PATH;
use feedesk_auth::{AuthError, EdgeAction};

use crate::error::ApiError;
use crate::extract::token_from_headers;
use crate::AppState;

/// Runs [`EdgeFilter::evaluate`](feedesk_auth::EdgeFilter::evaluate) in front
/// of every route
pub async fn edge_filter(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = token_from_headers(request.headers());
    let action = state.edge.evaluate(request.uri().path(), token.as_deref());

    match action {
        EdgeAction::Continue => next.run(request).await,
        EdgeAction::RedirectToLogin => {
            debug!(path = request.uri().path(), "Anonymous request redirected to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
        EdgeAction::Redirect(to) => Redirect::temporary(to).into_response(),
        EdgeAction::Unauthorized => ApiError::from(AuthError::Unauthenticated).into_response(),
    }
}
