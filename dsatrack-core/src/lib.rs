//! dsatrack-core: domain types for the study tracker
//!
//! Pure logic with no I/O: validated input types, the revision queue
//! position rules, and stats aggregation. Storage and HTTP live in
//! `dsatrack-server`.

pub mod models;
pub mod queue;
pub mod stats;

pub use models::{
    NewQuestion, Password, Question, QuestionName, QuestionNumber, Topics, User, Username,
    ValidationError,
};
pub use queue::{next_position, pick_next, Revision};
pub use stats::{attempts_per_day, topic_distribution, DayWindow, Stats, StatsWindow};
