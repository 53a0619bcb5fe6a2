//! PostgreSQL Database Module
//!
//! Provides durable storage for users, questions, answers, and
//! notifications. Postgres is optional at runtime; when disabled the
//! stores in `crate::store` run purely in memory.

pub mod content;
pub mod notifications;
pub mod pool;
pub mod users;

pub use content::ContentRepository;
pub use notifications::NotificationRepository;
pub use pool::DatabasePool;
pub use users::UserRepository;
