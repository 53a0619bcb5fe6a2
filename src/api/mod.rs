//! HTTP API - REST endpoints for the Q&A service
//!
//! Route groups, each with its own router nested under /api in main:
//!
//! ```text
//!   /api/auth           register / login / current user
//!   /api/vote           cast, toggle, or switch a vote
//!   /api/questions      ask, fetch, answer
//!   /api/answers        accept / unaccept an answer
//!   /api/notifications  durable inbox + SSE stream
//! ```
//!
//! Every handler resolves the caller through [`auth::authenticate`] and
//! returns errors as `(StatusCode, Json)` pairs with an `{"error": ...}`
//! body.

pub mod answers;
pub mod auth;
pub mod middleware;
pub mod notifications;
pub mod questions;
pub mod vote;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use crate::acceptance::AcceptanceService;
use crate::notify::{ConnectionRegistry, NotificationDispatcher};
use crate::store::{ContentStore, NotificationStore, UserStore};
use crate::voting::VoteService;

pub use auth::SessionStore;

/// Shared state handed to every API router.
#[derive(Clone)]
pub struct ApiState {
    pub sessions: Arc<SessionStore>,
    pub users: Arc<UserStore>,
    pub content: Arc<ContentStore>,
    pub notifications: Arc<NotificationStore>,
    pub registry: Arc<ConnectionRegistry>,
    pub votes: Arc<VoteService>,
    pub acceptance: Arc<AcceptanceService>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

/// Error shape returned by API handlers.
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}
