use async_trait::async_trait;
use database::{PageInfo, PageRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{UpdateUser, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Newest first
    async fn list(&self, page: PageRequest) -> UserResult<(Vec<User>, PageInfo)>;

    async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<User>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given accounts already registered.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn list(&self, page: PageRequest) -> UserResult<(Vec<User>, PageInfo)> {
        let users = self.users.read().await;

        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let info = PageInfo::new(page, all.len() as u64);
        Ok((page.slice(&all), info))
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        user.apply_update(&input);

        tracing::info!(user_id = %id, "Updated user");
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
