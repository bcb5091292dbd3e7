//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod user;
pub mod question;

pub use validation::ValidationError;
pub use user::{Password, User, Username};
pub use question::{NewQuestion, Question, QuestionName, QuestionNumber, Topics};
