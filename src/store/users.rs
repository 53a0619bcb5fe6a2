//! User store - identity records and the reputation counter

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::User;

pub struct UserStore {
    db: Option<Arc<DatabasePool>>,

    /// In-memory user records, keyed by id
    users: Arc<RwLock<HashMap<Uuid, User>>>,

    /// Username -> id lookup for login
    by_username: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            db: None,
            users: Arc::new(RwLock::new(HashMap::new())),
            by_username: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_database(mut self, db: Arc<DatabasePool>) -> Self {
        self.db = Some(db);
        self
    }

    pub async fn insert_user(&self, user: User) -> Result<()> {
        if let Some(ref db) = self.db {
            db.users()
                .upsert_user(&user)
                .await
                .map_err(|e| anyhow!(e))?;
        }

        {
            let mut by_username = self.by_username.write().await;
            by_username.insert(user.username.clone(), user.id);
        }
        {
            let mut users = self.users.write().await;
            users.insert(user.id, user);
        }

        Ok(())
    }

    pub async fn get_user(&self, id: Uuid) -> Option<User> {
        {
            let users = self.users.read().await;
            if let Some(user) = users.get(&id) {
                return Some(user.clone());
            }
        }

        if let Some(ref db) = self.db {
            if let Ok(Some(user)) = db.users().get_user(id).await {
                let mut users = self.users.write().await;
                users.insert(id, user.clone());
                return Some(user);
            }
        }

        None
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        let id = {
            let by_username = self.by_username.read().await;
            by_username.get(username).copied()
        };
        if let Some(id) = id {
            return self.get_user(id).await;
        }

        if let Some(ref db) = self.db {
            if let Ok(Some(user)) = db.users().get_user_by_username(username).await {
                let mut by_username = self.by_username.write().await;
                by_username.insert(user.username.clone(), user.id);
                let mut users = self.users.write().await;
                users.insert(user.id, user.clone());
                return Some(user);
            }
        }

        None
    }

    /// Apply a reputation delta to a user.
    ///
    /// Reputation has no floor; deltas may drive it negative.
    pub async fn adjust_reputation(&self, id: Uuid, delta: i64) -> Result<()> {
        // Make sure the record is cached before mutating it
        let user = self
            .get_user(id)
            .await
            .ok_or_else(|| anyhow!("User not found: {}", id))?;

        if let Some(ref db) = self.db {
            db.users()
                .adjust_reputation(id, delta)
                .await
                .map_err(|e| anyhow!(e))?;
        }

        {
            let mut users = self.users.write().await;
            if let Some(entry) = users.get_mut(&id) {
                entry.reputation += delta;
                entry.last_active = Utc::now();
            }
        }

        debug!(
            user_id = %id,
            delta = delta,
            previous = user.reputation,
            "Reputation adjusted"
        );

        Ok(())
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(name: &str) -> User {
        User::new(
            name.to_string(),
            format!("{}@example.com", name),
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = UserStore::new();
        let user = test_user("alice");
        let id = user.id;

        store.insert_user(user).await.unwrap();

        assert_eq!(store.get_user(id).await.unwrap().username, "alice");
        assert_eq!(store.get_user_by_username("alice").await.unwrap().id, id);
        assert!(store.get_user_by_username("bob").await.is_none());
    }

    #[tokio::test]
    async fn test_reputation_can_go_negative() {
        let store = UserStore::new();
        let user = test_user("carol");
        let id = user.id;
        store.insert_user(user).await.unwrap();

        store.adjust_reputation(id, -15).await.unwrap();

        assert_eq!(store.get_user(id).await.unwrap().reputation, -15);
    }

    #[tokio::test]
    async fn test_adjust_unknown_user_fails() {
        let store = UserStore::new();
        assert!(store.adjust_reputation(Uuid::new_v4(), 5).await.is_err());
    }
}
