//! Notification store - durable notification records
//!
//! The stored record is the sole source of truth; the live push channel
//! in `crate::notify` is only a latency optimization over it.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::Notification;

pub struct NotificationStore {
    db: Option<Arc<DatabasePool>>,
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            db: None,
            notifications: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_database(mut self, db: Arc<DatabasePool>) -> Self {
        self.db = Some(db);
        self
    }

    pub async fn insert(&self, notification: Notification) -> Result<()> {
        if let Some(ref db) = self.db {
            db.notifications()
                .insert_notification(&notification)
                .await
                .map_err(|e| anyhow!(e))?;
        }

        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id, notification);
        Ok(())
    }

    /// All notifications for a recipient, newest first
    pub async fn list_for_recipient(&self, recipient: Uuid) -> Vec<Notification> {
        if let Some(ref db) = self.db {
            if let Ok(from_db) = db.notifications().get_for_recipient(recipient).await {
                let mut notifications = self.notifications.write().await;
                for n in &from_db {
                    notifications.entry(n.id).or_insert_with(|| n.clone());
                }
            }
        }

        let notifications = self.notifications.read().await;
        let mut result: Vec<Notification> = notifications
            .values()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    pub async fn unread_count(&self, recipient: Uuid) -> usize {
        let notifications = self.notifications.read().await;
        notifications
            .values()
            .filter(|n| n.recipient == recipient && !n.is_read)
            .count()
    }

    /// Mark the given notifications read, skipping any not owned by the
    /// recipient. Idempotent.
    pub async fn mark_read(&self, ids: &[Uuid], recipient: Uuid) -> Result<()> {
        if let Some(ref db) = self.db {
            db.notifications()
                .mark_read(ids, recipient)
                .await
                .map_err(|e| anyhow!(e))?;
        }

        let mut notifications = self.notifications.write().await;
        for id in ids {
            if let Some(n) = notifications.get_mut(id) {
                if n.recipient == recipient {
                    n.is_read = true;
                }
            }
        }
        Ok(())
    }

    /// Mark all of the recipient's unread notifications read. Idempotent.
    pub async fn mark_all_read(&self, recipient: Uuid) -> Result<()> {
        if let Some(ref db) = self.db {
            db.notifications()
                .mark_all_read(recipient)
                .await
                .map_err(|e| anyhow!(e))?;
        }

        let mut notifications = self.notifications.write().await;
        for n in notifications.values_mut() {
            if n.recipient == recipient {
                n.is_read = true;
            }
        }
        Ok(())
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
