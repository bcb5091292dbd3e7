//! Storage layer - the `Store` trait and its implementations
//!
//! - `PgStore`: Postgres via sqlx, used in production
//! - `MemoryStore`: in-process, used by tests and `serve --in-memory`
//!
//! Operations that read and then rewrite a position (add, revise) run as
//! one unit: a transaction holding a per-user advisory lock in Postgres, a
//! single write lock in memory.

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repos;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dsatrack_core::{NewQuestion, Question, Stats, StatsWindow, User, Username};

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use repos::PgStore;

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("question number {0} already exists")]
    NumberTaken(i32),
}

/// Persistence operations used by the HTTP layer.
///
/// Every question operation is scoped to `user_id`; a question owned by
/// another user behaves exactly like a missing one.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend label reported by `/health`
    fn backend(&self) -> &'static str;

    /// Insert a user. Duplicate usernames fail with `UsernameTaken`.
    async fn create_user(&self, username: &Username, password_hash: &str)
        -> Result<User, StoreError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// All of the user's questions in queue order (position, then id).
    async fn list_questions(&self, user_id: i64) -> Result<Vec<Question>, StoreError>;

    /// Insert at the back of the user's queue.
    async fn add_question(
        &self,
        user_id: i64,
        question: NewQuestion,
        now: DateTime<Utc>,
    ) -> Result<Question, StoreError>;

    /// The lowest-position question, if any.
    async fn next_question(&self, user_id: i64) -> Result<Option<Question>, StoreError>;

    /// Count an attempt and move the question to the back of the queue.
    async fn revise_question(
        &self,
        user_id: i64,
        question_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Question, StoreError>;

    async fn question_count(&self, user_id: i64) -> Result<i64, StoreError>;

    /// `last_attempt` values within `[from, to]`.
    async fn last_attempts(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, StoreError>;

    /// Topic list of every question the user owns.
    async fn topic_lists(&self, user_id: i64) -> Result<Vec<Vec<String>>, StoreError>;

    /// Totals, seven-day attempt histogram and topic histogram.
    async fn stats(&self, user_id: i64, now: DateTime<Utc>) -> Result<Stats, StoreError> {
        let window = StatsWindow::ending_at(now);
        let total = self.question_count(user_id).await?;

        let attempts = match (window.start(), window.end()) {
            (Some(from), Some(to)) => self.last_attempts(user_id, from, to).await?,
            _ => Vec::new(),
        };
        let topics = self.topic_lists(user_id).await?;

        Ok(Stats::compute(total, &window, attempts, topics))
    }
}
