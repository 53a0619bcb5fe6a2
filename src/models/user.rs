//! User accounts and reputation counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A registered user.
///
/// Reputation starts at 0 and is only ever mutated through
/// `UserStore::adjust_reputation` as a side effect of votes and answer
/// acceptance. It has no floor and may go negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Salted password hash, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub reputation: i64,
    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            role: Role::User,
            avatar: None,
            reputation: 0,
            joined_at: Utc::now(),
            last_active: Utc::now(),
        }
    }
}

/// Public view of a user for API responses (no email / password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub reputation: i64,
    pub avatar: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            reputation: user.reputation,
            avatar: user.avatar.clone(),
        }
    }
}
