//! In-memory `Store`
//!
//! Same semantics as the Postgres store, including the global uniqueness
//! of question numbers. Each operation holds the lock for its whole
//! duration, so position updates never interleave.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dsatrack_core::{next_position, pick_next, NewQuestion, Question, Revision, User, Username};
use tokio::sync::RwLock;

use super::{Store, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    questions: Vec<Question>,
    last_user_id: i64,
    last_question_id: i64,
}

impl Inner {
    fn owned_by(&self, user_id: i64) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.user_id == user_id)
    }

    fn max_position(&self, user_id: i64) -> Option<i64> {
        self.owned_by(user_id).map(|q| q.position).max()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.username == username.as_str()) {
            return Err(StoreError::UsernameTaken(username.as_str().to_owned()));
        }

        inner.last_user_id += 1;
        let user = User {
            id: inner.last_user_id,
            username: username.as_str().to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_questions(&self, user_id: i64) -> Result<Vec<Question>, StoreError> {
        let inner = self.inner.read().await;
        let mut questions: Vec<Question> = inner.owned_by(user_id).cloned().collect();
        questions.sort_by_key(|q| (q.position, q.id));
        Ok(questions)
    }

    async fn add_question(
        &self,
        user_id: i64,
        question: NewQuestion,
        now: DateTime<Utc>,
    ) -> Result<Question, StoreError> {
        let mut inner = self.inner.write().await;

        let number = question.number.get();
        if inner.questions.iter().any(|q| q.number == number) {
            return Err(StoreError::NumberTaken(number));
        }

        let position = next_position(inner.max_position(user_id));
        inner.last_question_id += 1;

        let stored = Question {
            id: inner.last_question_id,
            user_id,
            number,
            name: question.name.into_string(),
            topics: question.topics.into_vec(),
            link: question.link,
            notes: question.notes,
            date_added: now,
            attempt_count: 0,
            last_attempt: None,
            position,
        };
        inner.questions.push(stored.clone());
        Ok(stored)
    }

    async fn next_question(&self, user_id: i64) -> Result<Option<Question>, StoreError> {
        let inner = self.inner.read().await;
        Ok(pick_next(inner.owned_by(user_id)).cloned())
    }

    async fn revise_question(
        &self,
        user_id: i64,
        question_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Question, StoreError> {
        let mut inner = self.inner.write().await;

        let max = inner.max_position(user_id);
        let question = inner
            .questions
            .iter_mut()
            .find(|q| q.id == question_id && q.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound {
                resource: "question",
                id: question_id.to_string(),
            })?;

        Revision::of(question, max, now).apply_to(question);
        Ok(question.clone())
    }

    async fn question_count(&self, user_id: i64) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.owned_by(user_id).count() as i64)
    }

    async fn last_attempts(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .owned_by(user_id)
            .filter_map(|q| q.last_attempt)
            .filter(|at| *at >= from && *at <= to)
            .collect())
    }

    async fn topic_lists(&self, user_id: i64) -> Result<Vec<Vec<String>>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.owned_by(user_id).map(|q| q.topics.clone()).collect())
    }
}
