//! Axum server setup
//!
//! Router assembly plus the serve loop:
//! - CORS with credentials, restricted to known origins unless permissive
//! - Tracing and timeout middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::Auth;
use crate::config::HttpSettings;
use crate::db::Store;

/// Origins allowed when none are configured (local frontends)
const DEV_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Auth,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth: Auth) -> Self {
        Self { store, auth }
    }
}

/// Build the full application router.
pub fn build_router(state: Arc<AppState>, http: &HttpSettings) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(http.timeout_secs)))
        .layer(cors_layer(http));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::questions::router())
        .layer(middleware)
        .with_state(state)
}

fn cors_layer(http: &HttpSettings) -> CorsLayer {
    if http.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins mirrored with credentials");
        return CorsLayer::very_permissive();
    }

    let configured: Vec<&str> = if http.allowed_origins.is_empty() {
        DEV_ORIGINS.to_vec()
    } else {
        http.allowed_origins.iter().map(String::as_str).collect()
    };

    let origins: Vec<HeaderValue> = configured
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(PgStore::new(create_pool(&url, 5).await?));
/// let state = Arc::new(AppState::new(store, Auth::from_settings(&settings.auth)));
/// run_server(state, &settings.http).await?;
/// ```
pub async fn run_server(state: Arc<AppState>, http: &HttpSettings) -> Result<(), ServerError> {
    let app = build_router(state, http);

    let listener = TcpListener::bind(http.bind).await?;
    tracing::info!("Server listening on {}", http.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::AuthSettings;
    use crate::db::MemoryStore;

    fn app(http: &HttpSettings) -> Router {
        let auth = Auth::from_settings(&AuthSettings {
            jwt_secret: "0123456789abcdef0123456789abcdef".into(),
            ..AuthSettings::default()
        });
        let state = Arc::new(AppState::new(Arc::new(MemoryStore::new()), auth));
        build_router(state, http)
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/questions")
            .header("origin", origin)
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app(&HttpSettings::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn cors_allows_dev_origin_with_credentials() {
        let response = app(&HttpSettings::default())
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn cors_rejects_unknown_origin() {
        let http = HttpSettings {
            allowed_origins: vec!["https://tracker.example.com".into()],
            ..HttpSettings::default()
        };
        let response = app(&http)
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();

        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }
}
