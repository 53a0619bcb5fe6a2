//! Question endpoints - ask, fetch, and answer

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::models::{Answer, NotificationKind, Question, UserSummary, VoteState};

use super::auth::authenticate;
use super::{api_error, ApiError, ApiState};

#[derive(Deserialize)]
struct CreateQuestionRequest {
    title: String,
    description: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct CreateAnswerRequest {
    content: String,
}

#[derive(Default, Deserialize)]
struct ViewerQuery {
    /// Optional viewer id used to fill in `userVote` on each answer
    viewer: Option<Uuid>,
}

/// Answer as returned by the API, with the author expanded and the vote
/// score derived.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerView {
    id: Uuid,
    question: Uuid,
    content: String,
    author: Option<UserSummary>,
    vote_score: i64,
    upvotes: usize,
    downvotes: usize,
    user_vote: Option<VoteState>,
    is_accepted: bool,
    created_at: DateTime<Utc>,
}

impl AnswerView {
    fn build(answer: &Answer, author: Option<UserSummary>, viewer: Option<Uuid>) -> Self {
        Self {
            id: answer.id,
            question: answer.question,
            content: answer.content.clone(),
            author,
            vote_score: answer.votes.score(),
            upvotes: answer.votes.upvotes.len(),
            downvotes: answer.votes.downvotes.len(),
            user_vote: viewer.and_then(|v| answer.votes.state_for(v)),
            is_accepted: answer.is_accepted,
            created_at: answer.created_at,
        }
    }
}

async fn create_question(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Question>), ApiError> {
    let user = authenticate(&state, &headers).await?;

    let req: CreateQuestionRequest = serde_json::from_value(body)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "title and description required"))?;
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "title and description required",
        ));
    }

    let question = Question::new(
        req.title.trim().to_string(),
        req.description.trim().to_string(),
        req.tags,
        user.id,
    );
    state
        .content
        .save_question(&question)
        .await
        .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create question"))?;

    info!(question_id = %question.id, author = %user.id, "Question created");
    Ok((StatusCode::CREATED, Json(question)))
}

async fn get_question(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut question = state
        .content
        .get_question(id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Question not found"))?;

    question.views += 1;
    state
        .content
        .save_question(&question)
        .await
        .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load question"))?;

    let author = state
        .users
        .get_user(question.author)
        .await
        .map(|u| UserSummary::from(&u));

    Ok(Json(json!({
        "question": question,
        "author": author,
        "voteScore": question.votes.score(),
    })))
}

/// List a question's answers, accepted first, then oldest first.
async fn list_answers(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.content.get_question(id).await.is_none() {
        return Err(api_error(StatusCode::NOT_FOUND, "Question not found"));
    }

    let answers = state.content.answers_for_question(id).await;
    let mut views = Vec::with_capacity(answers.len());
    for answer in &answers {
        let author = state
            .users
            .get_user(answer.author)
            .await
            .map(|u| UserSummary::from(&u));
        views.push(AnswerView::build(answer, author, query.viewer));
    }

    Ok(Json(json!({ "answers": views })))
}

async fn post_answer(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<AnswerView>), ApiError> {
    let user = authenticate(&state, &headers).await?;

    let req: CreateAnswerRequest = serde_json::from_value(body)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "content required"))?;
    if req.content.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "content required"));
    }

    let question = state
        .content
        .get_question(id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Question not found"))?;

    let answer = Answer::new(question.id, user.id, req.content.trim().to_string());
    state
        .content
        .save_answer(&answer)
        .await
        .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to post answer"))?;

    // Notify the question author, unless they answered their own question.
    // Delivery is best effort; the answer is already saved either way.
    if question.author != user.id {
        let _ = state
            .dispatcher
            .notify(
                question.author,
                user.id,
                NotificationKind::Answer,
                format!("{} answered your question: \"{}\"", user.username, question.title),
                Some(question.id),
                Some(answer.id),
            )
            .await;
    }

    info!(answer_id = %answer.id, question_id = %question.id, author = %user.id, "Answer posted");

    let author = Some(UserSummary::from(&user));
    Ok((
        StatusCode::CREATED,
        Json(AnswerView::build(&answer, author, Some(user.id))),
    ))
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", post(create_question))
        .route("/{id}", get(get_question))
        .route("/{id}/answers", get(list_answers).post(post_answer))
        .with_state(state)
}
