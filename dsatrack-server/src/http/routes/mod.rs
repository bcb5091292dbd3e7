//! Route handlers organized by resource

pub mod auth;
pub mod health;
pub mod questions;

use serde::Serialize;

/// Plain `{"message": "..."}` body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
