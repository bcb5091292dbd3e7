//! Question repository
//!
//! Handles the per-user revision queue:
//! - add/revise: transaction + `pg_advisory_xact_lock(user_id)` so the
//!   max-position read and the write happen under one lock
//! - list/next: ordered by (position, id)
//! - stats inputs: count, last attempts in range, topic lists

use chrono::{DateTime, Utc};
use dsatrack_core::{next_position, NewQuestion, Question, Revision};
use sqlx::{FromRow, PgConnection, PgPool};

use super::is_unique_violation;
use crate::db::StoreError;

const QUESTION_COLUMNS: &str = "id, user_id, number, name, topics, link, notes, \
     date_added, attempt_count, last_attempt, position";

/// Question record from database
#[derive(Debug, Clone, FromRow)]
struct QuestionRow {
    id: i64,
    user_id: i64,
    number: i32,
    name: String,
    topics: Vec<String>,
    link: Option<String>,
    notes: Option<String>,
    date_added: DateTime<Utc>,
    attempt_count: i32,
    last_attempt: Option<DateTime<Utc>>,
    position: i64,
}

impl From<QuestionRow> for Question {
    fn from(r: QuestionRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            number: r.number,
            name: r.name,
            topics: r.topics,
            link: r.link,
            notes: r.notes,
            date_added: r.date_added,
            attempt_count: r.attempt_count,
            last_attempt: r.last_attempt,
            position: r.position,
        }
    }
}

/// Question repository
pub struct QuestionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> QuestionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Question>, StoreError> {
        let rows: Vec<QuestionRow> = sqlx::query_as(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE user_id = $1 ORDER BY position, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Question::from).collect())
    }

    /// Insert a question at the back of the user's queue (atomic).
    pub async fn insert(
        &self,
        user_id: i64,
        question: NewQuestion,
        now: DateTime<Utc>,
    ) -> Result<Question, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_queue(&mut tx, user_id).await?;

        let position = next_position(max_position(&mut tx, user_id).await?);
        let number = question.number.get();

        let row: QuestionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO questions
                (user_id, number, name, topics, link, notes, date_added, attempt_count, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(number)
        .bind(question.name.as_str())
        .bind(question.topics.as_slice())
        .bind(question.link.as_deref())
        .bind(question.notes.as_deref())
        .bind(now)
        .bind(position)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::NumberTaken(number)
            } else {
                StoreError::Sqlx(e)
            }
        })?;

        tx.commit().await?;
        Ok(row.into())
    }

    pub async fn next_for_user(&self, user_id: i64) -> Result<Option<Question>, StoreError> {
        let row: Option<QuestionRow> = sqlx::query_as(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE user_id = $1 \
             ORDER BY position, id LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Question::from))
    }

    /// Record an attempt and move the question to the back (atomic).
    ///
    /// A question owned by another user is reported as not found.
    pub async fn revise(
        &self,
        user_id: i64,
        question_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Question, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_queue(&mut tx, user_id).await?;

        let current: Question = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1 AND user_id = $2"
        ))
        .bind(question_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            resource: "question",
            id: question_id.to_string(),
        })?
        .into();

        let max = max_position(&mut tx, user_id).await?;
        let revision = Revision::of(&current, max, now);

        let row: QuestionRow = sqlx::query_as(&format!(
            r#"
            UPDATE questions
            SET attempt_count = $1, last_attempt = $2, position = $3
            WHERE id = $4
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(revision.attempt_count)
        .bind(revision.last_attempt)
        .bind(revision.position)
        .bind(question_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    pub async fn count_for_user(&self, user_id: i64) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    pub async fn last_attempts_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, StoreError> {
        let rows: Vec<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT last_attempt
            FROM questions
            WHERE user_id = $1 AND last_attempt >= $2 AND last_attempt <= $3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(at,)| at).collect())
    }

    pub async fn topic_lists(&self, user_id: i64) -> Result<Vec<Vec<String>>, StoreError> {
        let rows: Vec<(Vec<String>,)> =
            sqlx::query_as("SELECT topics FROM questions WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(|(topics,)| topics).collect())
    }
}

/// Serialise queue writes for one user until the transaction ends.
async fn lock_queue(conn: &mut PgConnection, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

async fn max_position(conn: &mut PgConnection, user_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let (max,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(position) FROM questions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(conn)
            .await?;
    Ok(max)
}
