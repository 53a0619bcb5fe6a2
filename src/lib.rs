//! Asklet
//!
//! Voting, reputation, and notification-delivery core for a community
//! question-and-answer service.
//!
//! ## Module Structure
//!
//! ```text
//! asklet/src/
//! ├── lib.rs          - Crate root with re-exports
//! ├── main.rs         - Server entrypoint
//! ├── config.rs       - Configuration management
//! ├── models/         - Domain types
//! │   ├── user.rs        - Accounts and reputation counters
//! │   ├── content.rs     - Questions, answers, vote sets
//! │   └── notification.rs - Durable notification records
//! ├── store/          - In-memory stores with optional Postgres write-through
//! │   ├── users.rs
//! │   ├── content.rs
//! │   └── notifications.rs
//! ├── voting/         - Vote toggle/switch engine and reputation side effects
//! │   ├── engine.rs      - Pure vote-set transition logic
//! │   └── service.rs     - Load, decide, persist, adjust reputation
//! ├── acceptance/     - Answer acceptance state machine
//! ├── notify/         - Live delivery
//! │   ├── registry.rs    - Per-user channel registry
//! │   └── dispatcher.rs  - Durable write + best-effort push
//! ├── api/            - HTTP endpoints (axum routers)
//! └── database/       - PostgreSQL persistence
//! ```

pub mod acceptance;
pub mod api;
pub mod config;
pub mod database;
pub mod models;
pub mod notify;
pub mod store;
pub mod voting;

// Re-export main types for convenience
pub use acceptance::{AcceptError, AcceptOutcome, AcceptanceService};
pub use api::{ApiState, SessionStore};
pub use config::AskletConfig;
pub use database::pool::DatabasePool;
pub use models::{
    Answer, Notification, NotificationKind, Question, Role, User, UserSummary, VoteDirection,
    VoteSets, VoteState, VoteTarget,
};
pub use notify::{ConnectionRegistry, NotificationDispatcher, NotificationEvent, NotificationPage};
pub use store::{ContentStore, NotificationStore, UserStore};
pub use voting::{ReputationPoints, VoteError, VoteReceipt, VoteService};
