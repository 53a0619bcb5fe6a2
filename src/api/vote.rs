//! Vote endpoint - POST /api/vote

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{VoteDirection, VoteState, VoteTarget};
use crate::voting::VoteError;

use super::auth::authenticate;
use super::{api_error, ApiError, ApiState};

/// Vote request body. Unknown `itemType` or `voteType` values fail
/// deserialization and are rejected as 400.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteRequest {
    item_id: Uuid,
    item_type: VoteTarget,
    vote_type: VoteDirection,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoteResponse {
    message: String,
    vote_score: i64,
    upvotes: usize,
    downvotes: usize,
    user_vote: Option<VoteState>,
}

async fn cast_vote(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<VoteResponse>, ApiError> {
    let user = authenticate(&state, &headers).await?;

    let req: VoteRequest = serde_json::from_value(body).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "itemId, itemType (question/answer), and voteType (up/down) required",
        )
    })?;

    let receipt = state
        .votes
        .cast_vote(user.id, req.item_type, req.item_id, req.vote_type)
        .await
        .map_err(|e| match e {
            VoteError::NotFound(_) => api_error(StatusCode::NOT_FOUND, e.to_string()),
            VoteError::SelfVote(_) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
            VoteError::Store(_) => {
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to vote")
            }
        })?;

    Ok(Json(VoteResponse {
        message: format!("Successfully {}", receipt.action.label()),
        vote_score: receipt.vote_score,
        upvotes: receipt.upvotes,
        downvotes: receipt.downvotes,
        user_vote: receipt.user_vote,
    }))
}

pub fn create_router(state: ApiState) -> Router {
    Router::new().route("/", post(cast_vote)).with_state(state)
}
