use async_trait::async_trait;
use database::{
    BaseRepository, ChildStore, MissingChildPolicy, PageInfo, PageRequest, reconcile,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    entity::{attribute, category},
    error::{CategoryError, CategoryResult},
    models::{Category, CategoryAttribute, CategoryAttributePatch, CreateCategory, UpdateCategory},
    repository::CategoryRepository,
};

/// `category_attributes` rows, always scoped to one category.
pub struct AttributeStore;

#[async_trait]
impl ChildStore for AttributeStore {
    type Input = CategoryAttributePatch;
    type Output = attribute::Model;
    const KIND: &'static str = "category attribute";

    async fn update_one(
        &self,
        txn: &DatabaseTransaction,
        category_id: Uuid,
        id: Uuid,
        input: &CategoryAttributePatch,
    ) -> Result<u64, DbErr> {
        let result = attribute::Entity::update_many()
            .set(attribute::ActiveModel::values(input))
            .filter(attribute::Column::Id.eq(id))
            .filter(attribute::Column::CategoryId.eq(category_id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn insert_many(
        &self,
        txn: &DatabaseTransaction,
        category_id: Uuid,
        inputs: Vec<CategoryAttributePatch>,
    ) -> Result<(), DbErr> {
        let rows = inputs
            .into_iter()
            .map(|input| attribute::ActiveModel::new_row(category_id, input.into_input()));
        attribute::Entity::insert_many(rows).exec(txn).await?;
        Ok(())
    }

    async fn list_for_parent(
        &self,
        txn: &DatabaseTransaction,
        category_id: Uuid,
    ) -> Result<Vec<attribute::Model>, DbErr> {
        attribute::Entity::find()
            .filter(attribute::Column::CategoryId.eq(category_id))
            .order_by_asc(attribute::Column::DisplayOrder)
            .order_by_asc(attribute::Column::CreatedAt)
            .all(txn)
            .await
    }
}

pub struct PgCategoryRepository {
    base: BaseRepository<category::Entity>,
    policy: MissingChildPolicy,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection, policy: MissingChildPolicy) -> Self {
        Self {
            base: BaseRepository::new(db),
            policy,
        }
    }

    /// Attributes for several categories in one query, grouped by category.
    async fn attributes_for(
        &self,
        category_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<CategoryAttribute>>, DbErr> {
        let rows = attribute::Entity::find()
            .filter(attribute::Column::CategoryId.is_in(category_ids))
            .order_by_asc(attribute::Column::DisplayOrder)
            .order_by_asc(attribute::Column::CreatedAt)
            .all(self.base.db())
            .await?;

        let mut grouped: HashMap<Uuid, Vec<CategoryAttribute>> = HashMap::new();
        for row in rows {
            grouped.entry(row.category_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

fn into_attributes(rows: Vec<attribute::Model>) -> Vec<CategoryAttribute> {
    rows.into_iter().map(Into::into).collect()
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, input: CreateCategory) -> CategoryResult<Category> {
        let id = Uuid::now_v7();
        let txn = self.base.db().begin().await?;

        let model = category::ActiveModel::from_create(id, &input)
            .insert(&txn)
            .await?;

        let patches = input.attributes.into_iter().map(Into::into).collect();
        let attributes = reconcile(&AttributeStore, &txn, id, patches, self.policy).await?;

        txn.commit().await?;

        tracing::info!(category_id = %id, attributes = attributes.len(), "Created category");
        Ok(model.into_category(into_attributes(attributes)))
    }

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        let Some(model) = self.base.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut attributes = self.attributes_for(vec![id]).await?;
        Ok(Some(
            model.into_category(attributes.remove(&id).unwrap_or_default()),
        ))
    }

    async fn list(&self, page: PageRequest) -> CategoryResult<(Vec<Category>, PageInfo)> {
        let select = category::Entity::find()
            .order_by_desc(category::Column::CreatedAt)
            .order_by_desc(category::Column::Id);

        let (models, info) = self.base.paginate(select, page).await?;

        let mut attributes = self
            .attributes_for(models.iter().map(|m| m.id).collect())
            .await?;

        let items = models
            .into_iter()
            .map(|m| {
                let attrs = attributes.remove(&m.id).unwrap_or_default();
                m.into_category(attrs)
            })
            .collect();

        Ok((items, info))
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category> {
        let txn = self.base.db().begin().await?;

        // Dropping `txn` on any early return rolls the whole patch back.
        let model = category::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CategoryError::NotFound(id))?;

        let model = if input.has_parent_changes() {
            let mut active: category::ActiveModel = model.into();
            active.apply_update(&input);
            active.update(&txn).await?
        } else {
            model
        };

        let attributes = match input.attributes {
            Some(patches) => reconcile(&AttributeStore, &txn, id, patches, self.policy).await?,
            None => AttributeStore.list_for_parent(&txn, id).await?,
        };

        txn.commit().await?;

        tracing::info!(category_id = %id, "Updated category");
        Ok(model.into_category(into_attributes(attributes)))
    }

    async fn delete(&self, id: Uuid) -> CategoryResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await?;

        if rows_affected > 0 {
            tracing::info!(category_id = %id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
