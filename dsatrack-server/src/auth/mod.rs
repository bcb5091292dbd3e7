//! Authentication primitives
//!
//! - `password`: argon2 hashing and verification
//! - `token`: HS256 JWT issue/verify, subject = username
//! - `cookie`: session cookie rendering and token extraction

pub mod cookie;
pub mod password;
pub mod token;

use thiserror::Error;

pub use cookie::{token_from_headers, CookiePolicy};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys};

use crate::config::AuthSettings;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hash error: {0}")]
    Hash(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Everything the HTTP layer needs to authenticate requests
#[derive(Clone)]
pub struct Auth {
    pub keys: TokenKeys,
    pub cookies: CookiePolicy,
}

impl Auth {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            keys: TokenKeys::new(settings.jwt_secret.as_bytes(), settings.token_ttl_secs),
            cookies: CookiePolicy::from_settings(settings),
        }
    }
}
