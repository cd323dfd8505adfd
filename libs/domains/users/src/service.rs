use axum_helpers::{JwtClaims, Role};
use database::PageRequest;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{DEFAULT_PAGE_SIZE, UpdateUser, User, UserListQuery, UserPage};
use crate::repository::UserRepository;

/// Service layer for user accounts
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    pub async fn list_users(&self, query: UserListQuery) -> UserResult<UserPage> {
        let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
        let (items, info) = self.repository.list(page).await?;
        Ok(UserPage::new(items, info))
    }

    /// Update a profile on behalf of `actor`. Only the account owner or an
    /// admin may do so.
    pub async fn update_user(
        &self,
        actor: &JwtClaims,
        id: Uuid,
        input: UpdateUser,
    ) -> UserResult<User> {
        if actor.sub != id && !actor.has_role(Role::Admin) {
            tracing::warn!(actor = %actor.sub, target = %id, "Rejected profile update");
            return Err(UserError::Forbidden);
        }

        if input.is_empty() {
            return Err(UserError::NoUpdates);
        }

        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }
}
