//! DataTrail Ingestion Server
//!
//! HTTP endpoint that accepts opaque event payload uploads from many
//! independent client processes, authenticates each upload against a
//! remote credential check, and durably appends accepted payloads to the
//! uploader's append-only log.
//!
//! ## Request Flow
//!
//! ```text
//! POST /upload?username=..&password=..[&course=..]
//!     ↓
//! READ_INPUT     read body (exactly Content-Length bytes when declared)
//!     ↓
//! AUTHENTICATE   remote credential check (fail closed)
//!     ↓
//! COMMIT         IndexedLog::append under the pair's file lock
//!     ↓
//! 200 OK
//! ```
//!
//! Failure exits: short input → 400, rejected credentials → 403, anything
//! unexpected → 500. No failure before COMMIT touches the log files.

use std::sync::Arc;

use axum::{routing::post, Router};
use datatrail_storage::IndexedLog;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

pub use auth::Authenticator;
pub use config::ServerConfig;
pub use error::{IngestError, Result};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<IndexedLog>,
    pub auth: Arc<Authenticator>,
}

/// Create the ingestion router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(handlers::ingest::upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
