//! Postgres repositories
//!
//! Each repository follows these patterns:
//! - Relies on DB constraints for uniqueness (no check-then-insert)
//! - Uses transactions for multi-step operations

pub mod questions;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dsatrack_core::{NewQuestion, Question, User, Username};
use sqlx::PgPool;

pub use questions::QuestionRepo;
pub use users::UserRepo;

use super::{Store, StoreError};

/// `Store` backed by a Postgres pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        UserRepo::new(&self.pool).create(username, password_hash).await
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        UserRepo::new(&self.pool).find(username).await
    }

    async fn list_questions(&self, user_id: i64) -> Result<Vec<Question>, StoreError> {
        QuestionRepo::new(&self.pool).list_for_user(user_id).await
    }

    async fn add_question(
        &self,
        user_id: i64,
        question: NewQuestion,
        now: DateTime<Utc>,
    ) -> Result<Question, StoreError> {
        QuestionRepo::new(&self.pool).insert(user_id, question, now).await
    }

    async fn next_question(&self, user_id: i64) -> Result<Option<Question>, StoreError> {
        QuestionRepo::new(&self.pool).next_for_user(user_id).await
    }

    async fn revise_question(
        &self,
        user_id: i64,
        question_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Question, StoreError> {
        QuestionRepo::new(&self.pool).revise(user_id, question_id, now).await
    }

    async fn question_count(&self, user_id: i64) -> Result<i64, StoreError> {
        QuestionRepo::new(&self.pool).count_for_user(user_id).await
    }

    async fn last_attempts(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, StoreError> {
        QuestionRepo::new(&self.pool)
            .last_attempts_between(user_id, from, to)
            .await
    }

    async fn topic_lists(&self, user_id: i64) -> Result<Vec<Vec<String>>, StoreError> {
        QuestionRepo::new(&self.pool).topic_lists(user_id).await
    }
}

/// Postgres unique_violation (SQLSTATE 23505)
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
