//! Generic CRUD helpers over a sea-orm entity keyed by `Uuid`.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    PrimaryKeyTrait, Select,
};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::pagination::{PageInfo, PageRequest};

/// Entities whose primary key is a single `Uuid` column.
pub trait UuidEntity: EntityTrait {}

impl<E> UuidEntity for E
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
}

/// Shared data access for the simple, non-transactional paths of a repository.
///
/// Domain repositories wrap one of these and add their own queries; writes
/// that span several tables open their own transaction instead.
#[derive(Clone)]
pub struct BaseRepository<E: UuidEntity> {
    db: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E> BaseRepository<E>
where
    E: UuidEntity,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
{
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(&self.db).await
    }

    pub async fn insert(&self, model: E::ActiveModel) -> Result<E::Model, DbErr> {
        model.insert(&self.db).await
    }

    /// Returns the number of deleted rows (0 or 1).
    pub async fn delete_by_id(&self, id: Uuid) -> Result<u64, DbErr> {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    /// Run `select` one page at a time; the count and the page use the same filters.
    pub async fn paginate(
        &self,
        select: Select<E>,
        request: PageRequest,
    ) -> Result<(Vec<E::Model>, PageInfo), DbErr> {
        let paginator = select.paginate(&self.db, request.limit);
        let total_items = paginator.num_items().await?;
        let models = paginator.fetch_page(request.index()).await?;
        Ok((models, PageInfo::new(request, total_items)))
    }
}
