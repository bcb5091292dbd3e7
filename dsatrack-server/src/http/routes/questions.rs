//! Question endpoints: list, add, revise, next, stats
//!
//! All routes require an authenticated caller and only ever see the
//! caller's own questions.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use dsatrack_core::{NewQuestion, Question, Stats};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::{ApiPath, AuthUser, JsonBody};
use crate::http::server::AppState;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Add question request; field checks happen in `NewQuestion::new`
#[derive(Deserialize)]
pub struct CreateQuestionRequest {
    pub number: Option<i64>,
    #[serde(default)]
    pub name: String,
    pub topics: Option<Vec<String>>,
    pub link: Option<String>,
    pub notes: Option<String>,
}

/// Question response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: i64,
    pub number: i32,
    pub name: String,
    pub topics: Vec<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub date_added: String,
    pub attempt_count: i32,
    pub last_attempt: Option<String>,
    pub position: i64,
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            number: q.number,
            name: q.name,
            topics: q.topics,
            link: q.link,
            notes: q.notes,
            date_added: format_timestamp(q.date_added),
            attempt_count: q.attempt_count,
            last_attempt: q.last_attempt.map(format_timestamp),
            position: q.position,
        }
    }
}

/// GET /api/questions - the caller's queue, front first
async fn list_questions(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let questions = state.store.list_questions(user.id).await?;
    Ok(Json(
        questions.into_iter().map(QuestionResponse::from).collect(),
    ))
}

/// POST /api/questions - add at the back of the queue
async fn add_question(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonBody(req): JsonBody<CreateQuestionRequest>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let new = NewQuestion::new(req.number, &req.name, req.topics, req.link, req.notes)?;
    let question = state.store.add_question(user.id, new, Utc::now()).await?;
    tracing::info!(
        user_id = user.id,
        question_id = question.id,
        position = question.position,
        "question added"
    );
    Ok(Json(QuestionResponse::from(question)))
}

/// POST /api/questions/{id}/revise - count an attempt, move to the back
async fn revise_question(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = state.store.revise_question(user.id, id, Utc::now()).await?;
    tracing::info!(
        user_id = user.id,
        question_id = question.id,
        attempts = question.attempt_count,
        position = question.position,
        "question revised"
    );
    Ok(Json(QuestionResponse::from(question)))
}

/// GET /api/questions/next - front of the queue, 204 when empty
async fn next_question(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    Ok(match state.store.next_question(user.id).await? {
        Some(question) => Json(QuestionResponse::from(question)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// GET /api/questions/stats
async fn stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.store.stats(user.id, Utc::now()).await?))
}

/// Question routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/questions", get(list_questions).post(add_question))
        .route("/api/questions/next", get(next_question))
        .route("/api/questions/stats", get(stats))
        .route("/api/questions/{id}/revise", post(revise_question))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn response_uses_camel_case_and_formatted_dates() {
        let added = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let question = Question {
            id: 1,
            user_id: 9,
            number: 42,
            name: "Two Sum".into(),
            topics: vec!["arrays".into()],
            link: None,
            notes: Some("hash map".into()),
            date_added: added,
            attempt_count: 0,
            last_attempt: None,
            position: 1,
        };

        let json = serde_json::to_value(QuestionResponse::from(question)).unwrap();
        assert_eq!(json["dateAdded"], "2024-03-09 07:05:01");
        assert_eq!(json["attemptCount"], 0);
        assert!(json["lastAttempt"].is_null());
        assert_eq!(json["topics"][0], "arrays");
        assert!(json.get("userId").is_none());
    }
}
