//! Router tests against the in-memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use dsatrack_server::auth::Auth;
use dsatrack_server::config::{AuthSettings, HttpSettings};
use dsatrack_server::{build_router, AppState, MemoryStore};

const SECRET: &str = "0123456789abcdef0123456789abcdef";

fn app() -> Router {
    let auth = Auth::from_settings(&AuthSettings {
        jwt_secret: SECRET.into(),
        ..AuthSettings::default()
    });
    let state = Arc::new(AppState::new(Arc::new(MemoryStore::new()), auth));
    build_router(state, &HttpSettings::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_bearer(mut req: Request<Body>, token: &str) -> Request<Body> {
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    req
}

fn get(uri: &str, token: &str) -> Request<Body> {
    with_bearer(
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
        token,
    )
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, username: &str) -> Response {
    app.clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "username": username, "password": "password123" }),
        ))
        .await
        .unwrap()
}

/// Register + login, returning the bearer token.
async fn login(app: &Router, username: &str) -> String {
    assert_eq!(register(app, username).await.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": username, "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    json_body(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn add(app: &Router, token: &str, number: i64, topics: &[&str]) -> Value {
    let response = app
        .clone()
        .oneshot(with_bearer(
            post_json(
                "/api/questions",
                json!({
                    "number": number,
                    "name": format!("Problem {number}"),
                    "topics": topics,
                }),
            ),
            token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

async fn revise(app: &Router, token: &str, id: i64) -> Response {
    app.clone()
        .oneshot(with_bearer(
            Request::builder()
                .method("POST")
                .uri(format!("/api/questions/{id}/revise"))
                .body(Body::empty())
                .unwrap(),
            token,
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn register_twice_fails() {
    let app = app();

    let first = register(&app, "alice").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(
        json_body(first).await,
        json!({ "message": "User registered successfully!" })
    );

    let second = register(&app, "alice").await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(second).await,
        json!({ "message": "Error: Username is already taken!" })
    );
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = app();
    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "username": "al", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Status and `message` of a response that must carry a JSON error body
async fn json_error(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/json"), "{content_type}");

    let message = json_body(response).await["message"]
        .as_str()
        .unwrap()
        .to_string();
    (status, message)
}

#[tokio::test]
async fn malformed_bodies_get_json_400() {
    let app = app();

    let wrong_type = post_json(
        "/api/auth/register",
        json!({ "username": 5, "password": "password123" }),
    );
    let not_json = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let wrong_content_type = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(
            json!({ "username": "alice", "password": "password123" }).to_string(),
        ))
        .unwrap();

    for req in [wrong_type, not_json, wrong_content_type] {
        let response = app.clone().oneshot(req).await.unwrap();
        let (status, message) = json_error(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!message.is_empty());
    }
}

#[tokio::test]
async fn malformed_question_input_gets_json_400() {
    let app = app();
    let token = login(&app, "alice").await;

    let wrong_type = with_bearer(
        post_json("/api/questions", json!({ "number": "seven", "name": "Two Sum" })),
        &token,
    );
    let (status, _) = json_error(app.clone().oneshot(wrong_type).await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_id = with_bearer(
        Request::builder()
            .method("POST")
            .uri("/api/questions/abc/revise")
            .body(Body::empty())
            .unwrap(),
        &token,
    );
    let (status, _) = json_error(app.oneshot(bad_id).await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_sets_http_only_cookie() {
    let app = app();
    register(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "alice", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("jwt-token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body = json_body(response).await;
    assert_eq!(body["type"], "Bearer");
    assert_eq!(body["username"], "alice");

    // The cookie alone authenticates
    let token_pair = cookie.split(';').next().unwrap().to_string();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/questions")
                .header(header::COOKIE, token_pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let app = app();
    register(&app, "alice").await;

    for (username, password) in [("alice", "wrong-password"), ("nobody", "password123")] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "username": username, "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = app();

    let no_token = app
        .clone()
        .oneshot(Request::builder().uri("/api/questions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(no_token.status(), StatusCode::UNAUTHORIZED);

    let bad_token = app
        .oneshot(get("/api/questions/stats", "not.a.token"))
        .await
        .unwrap();
    assert_eq!(bad_token.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("jwt-token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert_eq!(
        json_body(response).await,
        json!({ "message": "Logged out successfully!" })
    );
}

#[tokio::test]
async fn revise_moves_question_to_back() {
    let app = app();
    let token = login(&app, "alice").await;

    let first = add(&app, &token, 1, &["arrays"]).await;
    add(&app, &token, 2, &["graphs"]).await;
    add(&app, &token, 3, &[]).await;
    assert_eq!(first["position"], 1);
    assert_eq!(first["attemptCount"], 0);

    let response = revise(&app, &token, first["id"].as_i64().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let revised = json_body(response).await;
    assert_eq!(revised["attemptCount"], 1);
    assert!(revised["lastAttempt"].is_string());

    let list = json_body(app.clone().oneshot(get("/api/questions", &token)).await.unwrap()).await;
    let positions: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["position"].as_i64().unwrap())
        .collect();
    let numbers: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![2, 3, 1]);
    assert!(positions[..2].iter().all(|p| *p < positions[2]));

    let next = json_body(app.oneshot(get("/api/questions/next", &token)).await.unwrap()).await;
    assert_eq!(next["number"], 2);
}

#[tokio::test]
async fn next_is_empty_and_scoped_to_user() {
    let app = app();
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    let empty = app
        .clone()
        .oneshot(get("/api/questions/next", &bob))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::NO_CONTENT);

    add(&app, &alice, 10, &[]).await;
    let still_empty = app
        .clone()
        .oneshot(get("/api/questions/next", &bob))
        .await
        .unwrap();
    assert_eq!(still_empty.status(), StatusCode::NO_CONTENT);

    add(&app, &bob, 11, &[]).await;
    let next = json_body(
        app.oneshot(get("/api/questions/next", &bob))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(next["number"], 11);
    assert_eq!(next["position"], 1);
}

#[tokio::test]
async fn revising_another_users_question_is_404() {
    let app = app();
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    let question = add(&app, &alice, 5, &[]).await;
    let id = question["id"].as_i64().unwrap();

    assert_eq!(revise(&app, &bob, id).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(revise(&app, &alice, 999).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(revise(&app, &alice, id).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn add_rejects_duplicate_and_invalid_numbers() {
    let app = app();
    let token = login(&app, "alice").await;
    add(&app, &token, 7, &[]).await;

    for body in [
        json!({ "number": 7, "name": "Again" }),
        json!({ "number": 0, "name": "Zero" }),
        json!({ "name": "No number" }),
        json!({ "number": 8, "name": "   " }),
    ] {
        let response = app
            .clone()
            .oneshot(with_bearer(post_json("/api/questions", body), &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn stats_counts_only_own_questions() {
    let app = app();
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;

    let q = add(&app, &alice, 1, &["arrays", "dp"]).await;
    add(&app, &alice, 2, &["arrays"]).await;
    add(&app, &bob, 3, &["graphs"]).await;
    revise(&app, &alice, q["id"].as_i64().unwrap()).await;

    let stats = json_body(
        app.oneshot(get("/api/questions/stats", &alice))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(stats["totalQuestions"], 2);
    assert_eq!(stats["topicDistribution"], json!({ "arrays": 2, "dp": 1 }));

    let per_day = stats["attemptsPerDay"].as_object().unwrap();
    assert_eq!(per_day.len(), 7);
    assert_eq!(per_day.values().map(|v| v.as_i64().unwrap()).sum::<i64>(), 1);
}
