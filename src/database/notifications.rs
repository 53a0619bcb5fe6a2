//! Notification Repository - PostgreSQL operations for notifications

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Notification, NotificationKind};

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id UUID PRIMARY KEY,
                recipient UUID NOT NULL,
                sender UUID NOT NULL,
                kind VARCHAR(16) NOT NULL,
                message TEXT NOT NULL,
                related_question UUID,
                related_answer UUID,
                is_read BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create notifications table: {}", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_notifications_recipient \
             ON notifications (recipient, created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create notifications index: {}", e))?;

        Ok(())
    }

    pub async fn insert_notification(&self, notification: &Notification) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (id, recipient, sender, kind, message, related_question,
             related_answer, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET is_read = EXCLUDED.is_read
            "#,
        )
        .bind(notification.id)
        .bind(notification.recipient)
        .bind(notification.sender)
        .bind(kind_to_str(notification.kind))
        .bind(&notification.message)
        .bind(notification.related_question)
        .bind(notification.related_answer)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to insert notification: {}", e))?;

        debug!(notification_id = %notification.id, "Notification inserted");
        Ok(())
    }

    pub async fn get_for_recipient(&self, recipient: Uuid) -> Result<Vec<Notification>, String> {
        let rows = sqlx::query(
            r#"
            SELECT id, recipient, sender, kind, message, related_question,
                   related_answer, is_read, created_at
            FROM notifications
            WHERE recipient = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipient)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to get notifications: {}", e))?;

        Ok(rows.into_iter().map(row_to_notification).collect())
    }

    pub async fn mark_read(&self, ids: &[Uuid], recipient: Uuid) -> Result<(), String> {
        sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = ANY($1) AND recipient = $2",
        )
        .bind(ids)
        .bind(recipient)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to mark notifications read: {}", e))?;

        Ok(())
    }

    pub async fn mark_all_read(&self, recipient: Uuid) -> Result<(), String> {
        sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient = $1 AND is_read = FALSE",
        )
        .bind(recipient)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to mark all notifications read: {}", e))?;

        Ok(())
    }
}

fn kind_to_str(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Answer => "answer",
        NotificationKind::Accept => "accept",
        NotificationKind::Comment => "comment",
        NotificationKind::Mention => "mention",
    }
}

fn str_to_kind(kind: &str) -> NotificationKind {
    match kind {
        "accept" => NotificationKind::Accept,
        "comment" => NotificationKind::Comment,
        "mention" => NotificationKind::Mention,
        _ => NotificationKind::Answer,
    }
}

fn row_to_notification(row: sqlx::postgres::PgRow) -> Notification {
    let kind: String = row.get("kind");
    Notification {
        id: row.get("id"),
        recipient: row.get("recipient"),
        sender: row.get("sender"),
        kind: str_to_kind(&kind),
        message: row.get("message"),
        related_question: row.get("related_question"),
        related_answer: row.get("related_answer"),
        is_read: row.get("is_read"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}
