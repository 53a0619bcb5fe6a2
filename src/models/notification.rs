//! Durable notification records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What triggered a notification.
///
/// Unknown kinds on the wire are a deserialization error, not a pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone answered the recipient's question
    Answer,
    /// The recipient's answer was accepted
    Accept,
    Comment,
    Mention,
}

/// A notification for one recipient.
///
/// The stored record is the sole source of truth for delivery; the live
/// push channel is purely a latency optimization on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Uuid,
    pub sender: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub related_question: Option<Uuid>,
    pub related_answer: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: Uuid,
        sender: Uuid,
        kind: NotificationKind,
        message: String,
        related_question: Option<Uuid>,
        related_answer: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            sender,
            kind,
            message,
            related_question,
            related_answer,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
