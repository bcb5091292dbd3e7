//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use dsatrack_core::User;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::token_from_headers;

/// JSON request body; any parse failure is a 400 `ApiError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path parameters; any parse failure is a 400 `ApiError`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// The authenticated caller.
///
/// Reads the token from the session cookie (or the bearer header), checks
/// signature and expiry, then loads the user named by the token subject.
/// Any failure along the way rejects with 401.
pub struct AuthUser(pub User);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers, &state.auth.cookies.name)
            .ok_or(ApiError::Unauthorized)?;

        let claims = state.auth.keys.verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            ApiError::Unauthorized
        })?;

        let user = state
            .store
            .find_user(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(username = %claims.sub, "token subject has no account");
                ApiError::Unauthorized
            })?;

        Ok(Self(user))
    }
}
