//! Notification dispatcher - durable creation plus best-effort push

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{Notification, NotificationKind};
use crate::notify::registry::ConnectionRegistry;
use crate::store::NotificationStore;

/// Pagination summary for a notification listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: usize,
    pub pages: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of a recipient's notifications, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub pagination: Pagination,
}

/// Creates durable notifications and fans them out to live channels.
///
/// Creation succeeds or fails on the durable write alone; the push that
/// follows is fire-and-forget.
pub struct NotificationDispatcher {
    store: Arc<NotificationStore>,
    registry: Arc<ConnectionRegistry>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<NotificationStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Persist a notification, then attempt live delivery.
    pub async fn notify(
        &self,
        recipient: Uuid,
        sender: Uuid,
        kind: NotificationKind,
        message: String,
        related_question: Option<Uuid>,
        related_answer: Option<Uuid>,
    ) -> Result<Notification> {
        let notification = Notification::new(
            recipient,
            sender,
            kind,
            message,
            related_question,
            related_answer,
        );

        self.store.insert(notification.clone()).await?;

        info!(
            notification_id = %notification.id,
            recipient = %recipient,
            kind = ?kind,
            "Notification created"
        );

        // Best effort; a recipient without a live channel sees the record
        // on their next fetch
        self.registry.push(recipient, notification.clone());

        Ok(notification)
    }

    /// One page of the recipient's notifications, newest first.
    pub async fn list(
        &self,
        recipient: Uuid,
        page: usize,
        limit: usize,
        unread_only: bool,
    ) -> NotificationPage {
        let page = page.max(1);
        let limit = limit.max(1);

        let all = self.store.list_for_recipient(recipient).await;
        let unread_count = all.iter().filter(|n| !n.is_read).count();

        let filtered: Vec<Notification> = if unread_only {
            all.into_iter().filter(|n| !n.is_read).collect()
        } else {
            all
        };

        let total = filtered.len();
        let pages = total.div_ceil(limit);
        // Page and limit come straight from the query string; keep the
        // offset arithmetic from overflowing on absurd values
        let notifications = filtered
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        NotificationPage {
            notifications,
            unread_count,
            pagination: Pagination {
                current: page,
                pages,
                total,
                has_next: page < pages,
                has_prev: page > 1,
            },
        }
    }

    pub async fn mark_read(&self, ids: &[Uuid], recipient: Uuid) -> Result<()> {
        self.store.mark_read(ids, recipient).await
    }

    pub async fn mark_all_read(&self, recipient: Uuid) -> Result<()> {
        self.store.mark_all_read(recipient).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> NotificationDispatcher {
        NotificationDispatcher::new(
            Arc::new(NotificationStore::new()),
            Arc::new(ConnectionRegistry::new()),
        )
    }

    async fn seed(d: &NotificationDispatcher, recipient: Uuid, count: usize) {
        for i in 0..count {
            d.notify(
                recipient,
                Uuid::new_v4(),
                NotificationKind::Answer,
                format!("answer {}", i),
                None,
                None,
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_durable_without_live_channel() {
        let d = dispatcher();
        let recipient = Uuid::new_v4();

        // No channel connected; creation must still persist
        let created = d
            .notify(
                recipient,
                Uuid::new_v4(),
                NotificationKind::Accept,
                "accepted".to_string(),
                None,
                None,
            )
            .await
            .unwrap();

        let page = d.list(recipient, 1, 20, false).await;
        assert_eq!(page.notifications.len(), 1);
        assert_eq!(page.notifications[0].id, created.id);
        assert_eq!(page.unread_count, 1);
    }

    #[tokio::test]
    async fn test_live_delivery_when_connected() {
        let d = dispatcher();
        let recipient = Uuid::new_v4();
        let mut rx = d.registry().connect(recipient);

        // Skip the handshake
        rx.recv().await.unwrap();

        d.notify(
            recipient,
            Uuid::new_v4(),
            NotificationKind::Answer,
            "answered".to_string(),
            None,
            None,
        )
        .await
        .unwrap();

        match rx.recv().await {
            Some(crate::notify::NotificationEvent::Notification { data }) => {
                assert_eq!(data.message, "answered");
            }
            other => panic!("Expected notification event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pagination() {
        let d = dispatcher();
        let recipient = Uuid::new_v4();
        seed(&d, recipient, 5).await;

        let page = d.list(recipient, 2, 2, false).await;
        assert_eq!(page.notifications.len(), 2);
        assert_eq!(page.pagination.pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);

        let last = d.list(recipient, 3, 2, false).await;
        assert_eq!(last.notifications.len(), 1);
        assert!(!last.pagination.has_next);
    }

    #[tokio::test]
    async fn test_huge_page_number_returns_empty_page() {
        let d = dispatcher();
        let recipient = Uuid::new_v4();
        seed(&d, recipient, 3).await;

        let page = d.list(recipient, usize::MAX, 20, false).await;
        assert!(page.notifications.is_empty());
        assert_eq!(page.pagination.total, 3);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[tokio::test]
    async fn test_unread_only_filter() {
        let d = dispatcher();
        let recipient = Uuid::new_v4();
        seed(&d, recipient, 3).await;

        let ids: Vec<Uuid> = d
            .list(recipient, 1, 20, false)
            .await
            .notifications
            .iter()
            .take(1)
            .map(|n| n.id)
            .collect();
        d.mark_read(&ids, recipient).await.unwrap();

        let unread = d.list(recipient, 1, 20, true).await;
        assert_eq!(unread.notifications.len(), 2);
        assert_eq!(unread.unread_count, 2);
    }
}
