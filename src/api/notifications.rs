//! Notification endpoints - durable inbox plus the SSE live stream

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::{self, Stream};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use uuid::Uuid;

use crate::models::NotificationKind;
use crate::notify::{NotificationEvent, NotificationPage};

use super::auth::authenticate;
use super::{api_error, ApiError, ApiState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    unread_only: bool,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkReadRequest {
    #[serde(default)]
    notification_ids: Vec<Uuid>,
    #[serde(default)]
    mark_all: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    recipient_id: Uuid,
    message: String,
    #[serde(rename = "type")]
    kind: NotificationKind,
    related_question: Option<Uuid>,
    related_answer: Option<Uuid>,
}

async fn list_notifications(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<NotificationPage>, ApiError> {
    let user = authenticate(&state, &headers).await?;
    let page = state
        .dispatcher
        .list(user.id, query.page, query.limit, query.unread_only)
        .await;
    Ok(Json(page))
}

async fn mark_read(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = authenticate(&state, &headers).await?;

    let req: MarkReadRequest = serde_json::from_value(body).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "notificationIds or markAll required",
        )
    })?;
    if !req.mark_all && req.notification_ids.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "notificationIds or markAll required",
        ));
    }

    let result = if req.mark_all {
        state.dispatcher.mark_all_read(user.id).await
    } else {
        state.dispatcher.mark_read(&req.notification_ids, user.id).await
    };
    result.map_err(|_| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update notifications",
        )
    })?;

    Ok(Json(json!({ "message": "Notifications marked as read" })))
}

/// Create a notification on behalf of the caller. Used by internal
/// tooling; normal notifications are raised by the answer and acceptance
/// flows.
async fn create_notification(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let user = authenticate(&state, &headers).await?;

    let req: CreateRequest = serde_json::from_value(body).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "recipientId, message, and type (answer/accept/comment/mention) required",
        )
    })?;
    if req.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "message required"));
    }

    let notification = state
        .dispatcher
        .notify(
            req.recipient_id,
            user.id,
            req.kind,
            req.message,
            req.related_question,
            req.related_answer,
        )
        .await
        .map_err(|_| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create notification",
            )
        })?;

    Ok((StatusCode::CREATED, Json(json!({ "notification": notification }))))
}

/// Open the caller's live notification stream.
///
/// Registers an in-process channel for the user and forwards every queued
/// event as an SSE data frame. The first frame is always the connection
/// handshake. A reconnect replaces the registration; the superseded
/// stream ends when its channel closes.
async fn notification_stream(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user = authenticate(&state, &headers).await?;

    let rx = state.registry.connect(user.id);
    info!(user_id = %user.id, "Notification stream opened");

    Ok(Sse::new(event_stream(rx)).keep_alive(KeepAlive::default()))
}

/// Adapt a registry receiver into a stream of SSE data frames.
fn event_stream(
    rx: UnboundedReceiver<NotificationEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let payload = serde_json::to_string(&event).ok()?;
        Some((Ok::<Event, Infallible>(Event::default().data(payload)), rx))
    })
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/",
            get(list_notifications).put(mark_read).post(create_notification),
        )
        .route("/stream", get(notification_stream))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ConnectionRegistry;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_event_stream_yields_handshake_frame() {
        let registry = ConnectionRegistry::new();
        let rx = registry.connect(Uuid::new_v4());

        let mut events = Box::pin(event_stream(rx));
        // The registry queues the handshake before returning the receiver,
        // so the first frame is available immediately
        assert!(events.next().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_stream_builds_sse_response() {
        let registry = ConnectionRegistry::new();
        let rx = registry.connect(Uuid::new_v4());

        let response = Sse::new(event_stream(rx))
            .keep_alive(KeepAlive::default())
            .into_response();
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("text/event-stream")
        );
    }

    #[tokio::test]
    async fn test_stream_ends_when_channel_replaced() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();

        let old_rx = registry.connect(user);
        let mut old_stream = Box::pin(event_stream(old_rx));
        // Drain the handshake queued on the old channel
        assert!(old_stream.next().await.is_some());

        // A reconnect replaces the registration and drops the old sender
        let _new_rx = registry.connect(user);
        assert!(old_stream.next().await.is_none());
    }
}
