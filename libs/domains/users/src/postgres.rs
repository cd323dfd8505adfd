use async_trait::async_trait;
use database::{BaseRepository, PageInfo, PageRequest};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder};
use uuid::Uuid;

use crate::entity;
use crate::error::{UserError, UserResult};
use crate::models::{UpdateUser, User};
use crate::repository::UserRepository;

pub struct PgUserRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.base.find_by_id(id).await?.map(Into::into))
    }

    async fn list(&self, page: PageRequest) -> UserResult<(Vec<User>, PageInfo)> {
        let select = entity::Entity::find()
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id);

        let (models, info) = self.base.paginate(select, page).await?;
        Ok((models.into_iter().map(Into::into).collect(), info))
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<User> {
        let model = self
            .base
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut active: entity::ActiveModel = model.into();
        active.apply_update(&input);
        let model = active.update(self.base.db()).await?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await?;

        if rows_affected > 0 {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn user_row(id: Uuid) -> entity::Model {
        let now = chrono::Utc::now();
        entity::Model {
            id,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            phone: None,
            roles: vec!["customer".to_string()],
            email_verified: true,
            phone_verified: false,
            image: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo
            .update(
                Uuid::now_v7(),
                UpdateUser {
                    name: Some("Nobody".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_returns_stored_row() {
        let id = Uuid::now_v7();
        let mut renamed = user_row(id);
        renamed.name = "Ada L.".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(id)]])
            .append_query_results([vec![renamed]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let user = repo
            .update(
                id,
                UpdateUser {
                    name: Some("Ada L.".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.name, "Ada L.");
    }

    #[tokio::test]
    async fn test_delete_reports_missing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert!(!repo.delete(Uuid::now_v7()).await.unwrap());
    }
}
