//! HTTP layer
//!
//! Axum router with:
//! - Credentialed CORS (configured origins, localhost by default)
//! - Request tracing and a request timeout
//! - Cookie or bearer token authentication
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use extractors::{ApiPath, AuthUser, JsonBody};
pub use server::{build_router, run_server, AppState, ServerError};
