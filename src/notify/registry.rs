//! Live connection registry
//!
//! Tracks at most one open push channel per recipient. Connects,
//! disconnects, and pushes arrive from independent request-handling
//! tasks, so the map is a `DashMap`.

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

use crate::models::Notification;

/// Event sent over a recipient's live channel
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NotificationEvent {
    /// Handshake emitted immediately after the channel opens
    Connected { message: &'static str },
    /// A freshly created notification
    Notification { data: Notification },
}

impl NotificationEvent {
    pub fn connected() -> Self {
        NotificationEvent::Connected {
            message: "Connected",
        }
    }
}

/// Process-local map of recipient id to open push channel
pub struct ConnectionRegistry {
    channels: DashMap<Uuid, UnboundedSender<NotificationEvent>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Register a live channel for the recipient and return its receiving
    /// end. A new connection replaces any previous registration for the
    /// same recipient (the old receiver's stream simply ends). The
    /// handshake event is queued before this returns.
    pub fn connect(&self, recipient: Uuid) -> UnboundedReceiver<NotificationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Queue the handshake while we still hold the only sender
        let _ = tx.send(NotificationEvent::connected());
        self.channels.insert(recipient, tx);
        debug!(recipient = %recipient, "Live channel connected");
        rx
    }

    /// Deregister the recipient's channel, if any
    pub fn disconnect(&self, recipient: Uuid) {
        if self.channels.remove(&recipient).is_some() {
            debug!(recipient = %recipient, "Live channel disconnected");
        }
    }

    /// Best-effort push. A send failure means the channel went stale; it
    /// is deregistered silently. No channel at all is a silent no-op;
    /// the durable record will be seen on the next fetch.
    pub fn push(&self, recipient: Uuid, notification: Notification) {
        let stale = match self.channels.get(&recipient) {
            Some(tx) => tx
                .send(NotificationEvent::Notification { data: notification })
                .is_err(),
            None => false,
        };

        if stale {
            self.channels.remove(&recipient);
            debug!(recipient = %recipient, "Dropped stale live channel on push failure");
        }
    }

    /// Number of currently registered channels (for monitoring)
    pub fn connection_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
