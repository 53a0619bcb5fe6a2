//! Notification delivery
//!
//! Two layers: durable notification records (always written) and a
//! best-effort live push to any currently connected recipient.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────┐     ┌────────────────────┐
//! │ NotificationDispatcher │────►│ NotificationStore  │  (durable, source
//! │ (create + fan-out)     │     └────────────────────┘   of truth)
//! └───────────┬────────────┘
//!             │ best effort, no ack, no retry
//!             ▼
//! ┌────────────────────────┐
//! │ ConnectionRegistry     │  (process-local, one live
//! │ (recipient -> channel) │   channel per recipient)
//! └────────────────────────┘
//! ```
//!
//! The registry is process-local by design. In a horizontally scaled
//! deployment the notification may be created on a different instance
//! than the one holding the recipient's connection; fanning out across
//! instances would need a shared pub/sub backend and is intentionally
//! not papered over here.

mod dispatcher;
mod registry;

pub use dispatcher::{NotificationDispatcher, NotificationPage, Pagination};
pub use registry::{ConnectionRegistry, NotificationEvent};
