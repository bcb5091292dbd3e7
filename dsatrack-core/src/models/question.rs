//! Question types: the stored record and validated submission fields

use chrono::{DateTime, Utc};

use super::ValidationError;

const MAX_NAME_LEN: usize = 256;
const MAX_TOPIC_LEN: usize = 64;
const MAX_LINK_LEN: usize = 2048;

/// A stored practice question.
///
/// `position` is the revision-queue key; lowest is revised next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub user_id: i64,
    pub number: i32,
    pub name: String,
    pub topics: Vec<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub date_added: DateTime<Utc>,
    pub attempt_count: i32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub position: i64,
}

/// Validated problem number (1 or greater)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionNumber(i32);

impl QuestionNumber {
    /// Create from raw input; a missing number is `Empty`.
    pub fn new(raw: Option<i64>) -> Result<Self, ValidationError> {
        let value = raw.ok_or(ValidationError::Empty { field: "number" })?;

        if value < 1 || value > i64::from(i32::MAX) {
            return Err(ValidationError::OutOfRange {
                field: "number",
                min: 1,
                max: i64::from(i32::MAX),
            });
        }

        Ok(Self(value as i32))
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

/// Validated question name (non-blank, trimmed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionName(String);

impl QuestionName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }

        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Topic list for a question.
///
/// Topics are trimmed and blank entries dropped. Order is kept and
/// duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topics(Vec<String>);

impl Topics {
    pub fn new<I, S>(raw: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut topics = Vec::new();
        for topic in raw {
            let trimmed = topic.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.chars().count() > MAX_TOPIC_LEN {
                return Err(ValidationError::TooLong {
                    field: "topic",
                    max: MAX_TOPIC_LEN,
                });
            }
            topics.push(trimmed.to_owned());
        }
        Ok(Self(topics))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// A validated question submission, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub number: QuestionNumber,
    pub name: QuestionName,
    pub topics: Topics,
    pub link: Option<String>,
    pub notes: Option<String>,
}

impl NewQuestion {
    /// Validate every field of a submission.
    ///
    /// Blank `link`/`notes` become `None`.
    pub fn new(
        number: Option<i64>,
        name: &str,
        topics: Option<Vec<String>>,
        link: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        let number = QuestionNumber::new(number)?;
        let name = QuestionName::new(name)?;
        let topics = Topics::new(topics.unwrap_or_default())?;

        let link = non_blank(link);
        if let Some(l) = &link {
            if l.chars().count() > MAX_LINK_LEN {
                return Err(ValidationError::TooLong {
                    field: "link",
                    max: MAX_LINK_LEN,
                });
            }
        }

        Ok(Self {
            number,
            name,
            topics,
            link,
            notes: non_blank(notes),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
