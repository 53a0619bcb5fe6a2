//! User Repository - PostgreSQL operations for user accounts using sqlx

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Role, User};

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username VARCHAR(40) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role VARCHAR(16) NOT NULL DEFAULT 'user',
                avatar TEXT,
                reputation BIGINT NOT NULL DEFAULT 0,
                joined_at TIMESTAMPTZ NOT NULL,
                last_active TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create users table: {}", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_reputation ON users (reputation DESC)")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to create users index: {}", e))?;

        Ok(())
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO users
            (id, username, email, password_hash, role, avatar, reputation, joined_at, last_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                avatar = EXCLUDED.avatar,
                reputation = EXCLUDED.reputation,
                last_active = EXCLUDED.last_active
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(role_to_str(user.role))
        .bind(&user.avatar)
        .bind(user.reputation)
        .bind(user.joined_at)
        .bind(user.last_active)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to upsert user: {}", e))?;

        debug!(user_id = %user.id, "User upserted");
        Ok(())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, String> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, avatar,
                   reputation, joined_at, last_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to get user: {}", e))?;

        Ok(row.map(row_to_user))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, String> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, avatar,
                   reputation, joined_at, last_active
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to get user by username: {}", e))?;

        Ok(row.map(row_to_user))
    }

    /// Atomically apply a reputation delta to a user
    pub async fn adjust_reputation(&self, id: Uuid, delta: i64) -> Result<(), String> {
        sqlx::query("UPDATE users SET reputation = reputation + $2 WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to adjust reputation: {}", e))?;

        debug!(user_id = %id, delta = delta, "Reputation adjusted");
        Ok(())
    }
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Admin => "admin",
    }
}

fn row_to_user(row: sqlx::postgres::PgRow) -> User {
    let role: String = row.get("role");
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: if role == "admin" { Role::Admin } else { Role::User },
        avatar: row.get("avatar"),
        reputation: row.get("reputation"),
        joined_at: row.get::<DateTime<Utc>, _>("joined_at"),
        last_active: row.get::<DateTime<Utc>, _>("last_active"),
    }
}
