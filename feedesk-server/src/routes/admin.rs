//! `/api/admin/users`: account administration, admin only

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;

use feedesk_auth::{NewUser, Operation, UserUpdate};

use crate::error::ApiError;
use crate::extract::SessionToken;
use crate::AppState;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))
}

/// `GET /api/admin/users`
pub async fn list_users(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    crate::record_operation("list_users");
    state.manager.require(token.as_deref(), Operation::ManageUsers).await?;
    let users = state.manager.users().list().await?;
    Ok(Json(json!({ "success": true, "users": users })).into_response())
}

/// `POST /api/admin/users`
pub async fn create_user(
    State(state): State<AppState>,
    token: SessionToken,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<Response, ApiError> {
    crate::record_operation("create_user");
    let actor = state.manager.require(token.as_deref(), Operation::ManageUsers).await?;
    let new_user = body(payload)?;

    let user = state.manager.users().create(new_user).await?;
    info!(actor_id = actor.id, user_id = user.id, "Account created");
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "user": user }))).into_response())
}

/// `PUT /api/admin/users/:id`
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    token: SessionToken,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Response, ApiError> {
    crate::record_operation("update_user");
    let actor = state.manager.require(token.as_deref(), Operation::ManageUsers).await?;
    let update = body(payload)?;

    let user = state.manager.users().update(id, update).await?;
    info!(actor_id = actor.id, user_id = id, "Account updated");
    Ok(Json(json!({ "success": true, "user": user })).into_response())
}

/// `DELETE /api/admin/users/:id` (deactivates; rows are kept)
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    token: SessionToken,
) -> Result<Response, ApiError> {
    crate::record_operation("deactivate_user");
    let actor = state.manager.require(token.as_deref(), Operation::ManageUsers).await?;
    state.manager.users().deactivate(actor.id, id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}
