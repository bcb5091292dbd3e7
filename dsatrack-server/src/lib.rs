//! dsatrack-server: HTTP API for the study tracker
//!
//! Users register and log in (JWT carried in an HTTP-only cookie or a
//! bearer header), submit practice questions, revise them in queue order,
//! and read aggregate stats.

pub mod auth;
pub mod config;
pub mod db;
pub mod http;

pub use config::{ConfigError, Settings};
pub use db::{MemoryStore, PgStore, Store, StoreError};
pub use http::{build_router, run_server, AppState};
