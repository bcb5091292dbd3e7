//! Revision queue ordering
//!
//! Each user's questions form a queue ordered by `position`, lowest first.
//! New and freshly revised questions go to the back: `max + 1`.
//! Positions are not required to be unique or contiguous.

use chrono::{DateTime, Utc};

use crate::models::Question;

/// Position for a question joining the back of the queue.
///
/// `max` is the current highest position among the owner's questions,
/// `None` when the owner has none.
pub fn next_position(max: Option<i64>) -> i64 {
    max.unwrap_or(0) + 1
}

/// The question to revise next: lowest position, ties broken by lowest id.
pub fn pick_next<'a, I>(questions: I) -> Option<&'a Question>
where
    I: IntoIterator<Item = &'a Question>,
{
    questions
        .into_iter()
        .min_by_key(|q| (q.position, q.id))
}

/// Field updates produced by revising a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    pub attempt_count: i32,
    pub last_attempt: DateTime<Utc>,
    pub position: i64,
}

impl Revision {
    /// Compute the revision of `question` at `now`.
    ///
    /// `max_position` must be read from the owner's questions, including
    /// `question` itself.
    pub fn of(question: &Question, max_position: Option<i64>, now: DateTime<Utc>) -> Self {
        Self {
            attempt_count: question.attempt_count.saturating_add(1),
            last_attempt: now,
            position: next_position(max_position),
        }
    }

    /// Write the revision into `question`.
    pub fn apply_to(self, question: &mut Question) {
        question.attempt_count = self.attempt_count;
        question.last_attempt = Some(self.last_attempt);
        question.position = self.position;
    }
}
