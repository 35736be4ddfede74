//! `/api/auth/*`: login, logout, current user

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use feedesk_auth::Operation;

use crate::error::{ApiError, MISSING_CREDENTIALS};
use crate::extract::SessionToken;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    crate::record_operation("login");
    let Json(body) = payload.map_err(|_| ApiError::bad_request(MISSING_CREDENTIALS))?;
    let (Some(email), Some(password)) = (present(body.email), present(body.password)) else {
        return Err(ApiError::bad_request(MISSING_CREDENTIALS));
    };

    let signed_in = state.manager.sign_in(&email, &password).await?;

    let body = Json(json!({
        "success": true,
        "user": signed_in.user,
        "redirectPath": signed_in.redirect_path,
    }));
    Ok(([(header::SET_COOKIE, signed_in.cookie.to_header_value())], body).into_response())
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    crate::record_operation("logout");
    let cleared = state.manager.sign_out(token.as_deref()).await?;

    let body = Json(json!({ "success": true }));
    Ok(match cleared {
        Some(cookie) => ([(header::SET_COOKIE, cookie.to_header_value())], body).into_response(),
        None => body.into_response(),
    })
}

/// `GET /api/auth/me`
pub async fn me(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    crate::record_operation("me");
    let user = state.manager.require(token.as_deref(), Operation::ViewProfile).await?;
    Ok(Json(json!({ "success": true, "user": user })).into_response())
}
