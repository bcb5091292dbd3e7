//! Account endpoints: register, login, logout

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use dsatrack_core::{Password, Username, ValidationError};
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::auth::{hash_password, verify_password};
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::http::server::AppState;

/// Register and login body
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub username: String,
}

/// POST /api/auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let username = Username::new(&req.username)?;
    let password = Password::new(&req.password)?;

    let hash = hash_password(&password)?;
    let user = state.store.create_user(&username, &hash).await?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    Ok(Json(MessageResponse::new("User registered successfully!")))
}

/// POST /api/auth/login - sets the session cookie and returns the token
async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ValidationError::Empty { field: "username" }.into());
    }
    if req.password.trim().is_empty() {
        return Err(ValidationError::Empty { field: "password" }.into());
    }

    let Some(user) = state.store.find_user(username).await? else {
        tracing::warn!(username, "login failed: unknown user");
        return Err(ApiError::BadCredentials);
    };
    if !verify_password(&user.password_hash, &req.password)? {
        tracing::warn!(username, "login failed: wrong password");
        return Err(ApiError::BadCredentials);
    }

    let token = state.auth.keys.issue(&user.username, Utc::now())?;
    let cookie = state.auth.cookies.session(&token);
    tracing::info!(user_id = user.id, "user logged in");

    let body = LoginResponse {
        token,
        token_type: "Bearer",
        username: user.username,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /api/auth/logout - expires the session cookie
async fn logout(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::SET_COOKIE, state.auth.cookies.clearing())],
        Json(MessageResponse::new("Logged out successfully!")),
    )
        .into_response()
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}
