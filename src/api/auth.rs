//! Authentication - registration, login, and bearer-token sessions

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::DashMap;
use rand::RngCore;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::models::User;

use super::{api_error, ApiError, ApiState};

/// Opaque bearer-token session table.
///
/// Tokens are random 256-bit hex strings mapped to user ids. Sessions are
/// process-local and do not survive a restart.
pub struct SessionStore {
    tokens: DashMap<String, Uuid>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }

    /// Issue a fresh token for the given user.
    pub fn issue(&self, user_id: Uuid) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        self.tokens.insert(token.clone(), user_id);
        token
    }

    /// Resolve a token back to its user id.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        self.tokens.get(token).map(|entry| *entry.value())
    }

    pub fn revoke(&self, token: &str) {
        self.tokens.remove(token);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Salted SHA-256 password hash, stored as `salt$digest`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let digest = digest_with_salt(password, &salt);
    format!("{}${}", salt, digest)
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    digest_with_salt(password, salt) == digest
}

fn digest_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolve the calling user from an `Authorization: Bearer` header.
pub async fn authenticate(state: &ApiState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Unauthorized"))?;

    let user_id = state
        .sessions
        .resolve(token)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Unauthorized"))?;

    state
        .users
        .get_user(user_id)
        .await
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

#[derive(Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn register(
    State(state): State<ApiState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let req: RegisterRequest = serde_json::from_value(body).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "username, email, and password required",
        )
    })?;

    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.len() < 6 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "username, email, and password (6+ chars) required",
        ));
    }

    let existing = state.users.get_user_by_username(&req.username).await;
    if existing.is_some() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Username already taken"));
    }

    let user = User::new(
        req.username.trim().to_string(),
        req.email.trim().to_string(),
        hash_password(&req.password),
    );
    state
        .users
        .insert_user(user.clone())
        .await
        .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to register"))?;

    let token = state.sessions.issue(user.id);
    info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": user })),
    ))
}

async fn login(
    State(state): State<ApiState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req: LoginRequest = serde_json::from_value(body)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "username and password required"))?;

    let user = state
        .users
        .get_user_by_username(&req.username)
        .await
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    let token = state.sessions.issue(user.id);
    info!(user_id = %user.id, "User logged in");

    Ok(Json(json!({ "token": token, "user": user })))
}

async fn current_user(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(user))
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(current_user))
        .with_state(state)
}
