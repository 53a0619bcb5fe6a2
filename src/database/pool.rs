//! Database Connection Pool using sqlx

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::database::content::ContentRepository;
use crate::database::notifications::NotificationRepository;
use crate::database::users::UserRepository;

pub struct DatabasePool {
    pool: PgPool,
    users: UserRepository,
    content: ContentRepository,
    notifications: NotificationRepository,
}

impl DatabasePool {
    pub async fn new(connection_string: &str) -> Result<Self, String> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await
            .map_err(|e| format!("Failed to connect to PostgreSQL: {}", e))?;

        info!("Connected to PostgreSQL");

        let users = UserRepository::new(pool.clone());
        let content = ContentRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool.clone());

        Ok(Self {
            pool,
            users,
            content,
            notifications,
        })
    }

    pub async fn init_schema(&self) -> Result<(), String> {
        info!("Initializing database schema...");

        self.users.init_schema().await?;
        self.content.init_schema().await?;
        self.notifications.init_schema().await?;

        info!("Database schema initialized");
        Ok(())
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn content(&self) -> &ContentRepository {
        &self.content
    }

    pub fn notifications(&self) -> &NotificationRepository {
        &self.notifications
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
