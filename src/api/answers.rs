//! Answer acceptance endpoint - POST /api/answers/{id}/accept

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use crate::acceptance::AcceptError;

use super::auth::authenticate;
use super::{api_error, ApiError, ApiState};

/// Toggle acceptance of an answer. Only the question author may call this.
async fn accept_answer(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = authenticate(&state, &headers).await?;

    let outcome = state
        .acceptance
        .toggle_accept(id, user.id)
        .await
        .map_err(|e| match e {
            AcceptError::AnswerNotFound | AcceptError::QuestionNotFound => {
                api_error(StatusCode::NOT_FOUND, e.to_string())
            }
            AcceptError::NotQuestionAuthor => api_error(StatusCode::FORBIDDEN, e.to_string()),
            AcceptError::Store(_) => {
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to accept answer")
            }
        })?;

    let message = if outcome.accepted {
        "Answer accepted"
    } else {
        "Answer unaccepted"
    };
    Ok(Json(json!({ "message": message, "isAccepted": outcome.accepted })))
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/{id}/accept", post(accept_answer))
        .with_state(state)
}
