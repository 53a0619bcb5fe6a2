//! Data models for the Asklet Q&A system
//!
//! Questions and answers are the two votable entity kinds; both carry a
//! pair of voter-id sets from which the vote score is derived on demand.
//! Notifications are durable records with an optional best-effort live
//! delivery on top (see `crate::notify`).

mod content;
mod notification;
mod user;

pub use content::{Answer, Question, VoteDirection, VoteSets, VoteState, VoteTarget};
pub use notification::{Notification, NotificationKind};
pub use user::{Role, User, UserSummary};
