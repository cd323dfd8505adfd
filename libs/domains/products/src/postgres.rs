use async_trait::async_trait;
use database::{
    BaseRepository, ChildStore, MissingChildPolicy, PageInfo, PageRequest, ReconcileError,
    reconcile,
};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    entity::{
        attribute_value, image, model,
        product::{self, Children},
    },
    error::{ProductError, ProductResult},
    models::{
        CreateProduct, Product, ProductAttributeValuePatch, ProductFilter, ProductImagePatch,
        ProductModelPatch, UpdateProduct,
    },
    repository::ProductRepository,
};

/// `product_images` rows of one product.
pub struct ImageStore;

/// `product_models` rows of one product.
pub struct ModelStore;

/// `product_attribute_values` rows of one product.
pub struct AttributeValueStore;

#[async_trait]
impl ChildStore for ImageStore {
    type Input = ProductImagePatch;
    type Output = image::Model;
    const KIND: &'static str = "product image";

    async fn update_one(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        id: Uuid,
        input: &ProductImagePatch,
    ) -> Result<u64, DbErr> {
        let result = image::Entity::update_many()
            .set(image::ActiveModel::values(input))
            .filter(image::Column::Id.eq(id))
            .filter(image::Column::ProductId.eq(product_id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn insert_many(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        inputs: Vec<ProductImagePatch>,
    ) -> Result<(), DbErr> {
        let rows = inputs
            .into_iter()
            .map(|input| image::ActiveModel::new_row(product_id, input.into_input()));
        image::Entity::insert_many(rows).exec(txn).await?;
        Ok(())
    }

    async fn list_for_parent(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
    ) -> Result<Vec<image::Model>, DbErr> {
        images_of(txn, vec![product_id]).await
    }
}

#[async_trait]
impl ChildStore for ModelStore {
    type Input = ProductModelPatch;
    type Output = model::Model;
    const KIND: &'static str = "product model";

    async fn update_one(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        id: Uuid,
        input: &ProductModelPatch,
    ) -> Result<u64, DbErr> {
        let result = model::Entity::update_many()
            .set(model::ActiveModel::values(input))
            .filter(model::Column::Id.eq(id))
            .filter(model::Column::ProductId.eq(product_id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn insert_many(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        inputs: Vec<ProductModelPatch>,
    ) -> Result<(), DbErr> {
        let rows = inputs
            .into_iter()
            .map(|input| model::ActiveModel::new_row(product_id, input.into_input()));
        model::Entity::insert_many(rows).exec(txn).await?;
        Ok(())
    }

    async fn list_for_parent(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
    ) -> Result<Vec<model::Model>, DbErr> {
        models_of(txn, vec![product_id]).await
    }
}

#[async_trait]
impl ChildStore for AttributeValueStore {
    type Input = ProductAttributeValuePatch;
    type Output = attribute_value::Model;
    const KIND: &'static str = "product attribute value";

    async fn update_one(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        id: Uuid,
        input: &ProductAttributeValuePatch,
    ) -> Result<u64, DbErr> {
        let result = attribute_value::Entity::update_many()
            .set(attribute_value::ActiveModel::values(input))
            .filter(attribute_value::Column::Id.eq(id))
            .filter(attribute_value::Column::ProductId.eq(product_id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn insert_many(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        inputs: Vec<ProductAttributeValuePatch>,
    ) -> Result<(), DbErr> {
        let rows = inputs
            .into_iter()
            .map(|input| attribute_value::ActiveModel::new_row(product_id, input.into_input()));
        attribute_value::Entity::insert_many(rows).exec(txn).await?;
        Ok(())
    }

    async fn list_for_parent(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
    ) -> Result<Vec<attribute_value::Model>, DbErr> {
        attribute_values_of(txn, vec![product_id]).await
    }
}

async fn images_of<C: ConnectionTrait>(
    db: &C,
    product_ids: Vec<Uuid>,
) -> Result<Vec<image::Model>, DbErr> {
    image::Entity::find()
        .filter(image::Column::ProductId.is_in(product_ids))
        .order_by_asc(image::Column::DisplayOrder)
        .order_by_asc(image::Column::CreatedAt)
        .all(db)
        .await
}

async fn models_of<C: ConnectionTrait>(
    db: &C,
    product_ids: Vec<Uuid>,
) -> Result<Vec<model::Model>, DbErr> {
    model::Entity::find()
        .filter(model::Column::ProductId.is_in(product_ids))
        .order_by_asc(model::Column::DisplayOrder)
        .order_by_asc(model::Column::CreatedAt)
        .all(db)
        .await
}

async fn attribute_values_of<C: ConnectionTrait>(
    db: &C,
    product_ids: Vec<Uuid>,
) -> Result<Vec<attribute_value::Model>, DbErr> {
    attribute_value::Entity::find()
        .filter(attribute_value::Column::ProductId.is_in(product_ids))
        .order_by_asc(attribute_value::Column::CreatedAt)
        .all(db)
        .await
}

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn filter_condition(filter: &ProductFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(category_id) = filter.category_id {
        condition = condition.add(product::Column::CategoryId.eq(category_id));
    }
    if let Some(min) = filter.min_price {
        condition = condition.add(product::Column::BasePrice.gte(min));
    }
    if let Some(max) = filter.max_price {
        condition = condition.add(product::Column::BasePrice.lte(max));
    }
    if let Some(term) = &filter.name_contains {
        condition = condition.add(Expr::col(product::Column::Name).ilike(like_pattern(term)));
    }
    condition
}

pub struct PgProductRepository {
    base: BaseRepository<product::Entity>,
    policy: MissingChildPolicy,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection, policy: MissingChildPolicy) -> Self {
        Self {
            base: BaseRepository::new(db),
            policy,
        }
    }

    /// Children of several products, three queries in total.
    async fn children_for(&self, product_ids: Vec<Uuid>) -> Result<HashMap<Uuid, Children>, DbErr> {
        let db = self.base.db();
        let (images, models, attributes) = tokio::try_join!(
            images_of(db, product_ids.clone()),
            models_of(db, product_ids.clone()),
            attribute_values_of(db, product_ids),
        )?;

        let mut grouped: HashMap<Uuid, Children> = HashMap::new();
        for row in images {
            grouped.entry(row.product_id).or_default().images.push(row.into());
        }
        for row in models {
            grouped.entry(row.product_id).or_default().models.push(row.into());
        }
        for row in attributes {
            grouped
                .entry(row.product_id)
                .or_default()
                .attributes
                .push(row.into());
        }
        Ok(grouped)
    }

    /// Reconcile each child kind named in the patch; kinds left out are re-read as they are.
    async fn reconcile_children(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        images: Option<Vec<ProductImagePatch>>,
        models: Option<Vec<ProductModelPatch>>,
        attributes: Option<Vec<ProductAttributeValuePatch>>,
    ) -> ProductResult<Children> {
        let policy = self.policy;

        let (images, models, attributes) = tokio::try_join!(
            async move {
                match images {
                    Some(input) => reconcile(&ImageStore, txn, product_id, input, policy).await,
                    None => ImageStore
                        .list_for_parent(txn, product_id)
                        .await
                        .map_err(ReconcileError::from),
                }
            },
            async move {
                match models {
                    Some(input) => reconcile(&ModelStore, txn, product_id, input, policy).await,
                    None => ModelStore
                        .list_for_parent(txn, product_id)
                        .await
                        .map_err(ReconcileError::from),
                }
            },
            async move {
                match attributes {
                    Some(input) => {
                        reconcile(&AttributeValueStore, txn, product_id, input, policy).await
                    }
                    None => AttributeValueStore
                        .list_for_parent(txn, product_id)
                        .await
                        .map_err(ReconcileError::from),
                }
            },
        )?;

        Ok(Children {
            images: images.into_iter().map(Into::into).collect(),
            models: models.into_iter().map(Into::into).collect(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        })
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let id = Uuid::now_v7();
        let txn = self.base.db().begin().await?;

        let model = product::ActiveModel::from_create(id, &input)
            .insert(&txn)
            .await?;

        let children = self
            .reconcile_children(
                &txn,
                id,
                Some(input.images.into_iter().map(Into::into).collect()),
                Some(input.models.into_iter().map(Into::into).collect()),
                Some(input.attributes.into_iter().map(Into::into).collect()),
            )
            .await?;

        txn.commit().await?;

        tracing::info!(
            product_id = %id,
            images = children.images.len(),
            models = children.models.len(),
            attributes = children.attributes.len(),
            "Created product"
        );
        Ok(model.into_product(children))
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let Some(model) = self.base.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut children = self.children_for(vec![id]).await?;
        Ok(Some(
            model.into_product(children.remove(&id).unwrap_or_default()),
        ))
    }

    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> ProductResult<(Vec<Product>, PageInfo)> {
        let select = product::Entity::find()
            .filter(filter_condition(&filter))
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id);

        let (models, info) = self.base.paginate(select, page).await?;
        if models.is_empty() {
            return Ok((vec![], info));
        }

        let mut children = self
            .children_for(models.iter().map(|m| m.id).collect())
            .await?;

        let items = models
            .into_iter()
            .map(|m| {
                let own = children.remove(&m.id).unwrap_or_default();
                m.into_product(own)
            })
            .collect();

        Ok((items, info))
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let txn = self.base.db().begin().await?;

        // Dropping `txn` on any early return rolls the whole patch back.
        let existing = product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let model = if input.has_parent_changes() {
            let mut active: product::ActiveModel = existing.into();
            active.apply_update(&input);
            active.update(&txn).await?
        } else {
            existing
        };

        let children = self
            .reconcile_children(&txn, id, input.images, input.models, input.attributes)
            .await?;

        txn.commit().await?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(model.into_product(children))
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await?;

        if rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductStatus;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    fn product_row(id: Uuid) -> product::Model {
        let now = chrono::Utc::now();
        product::Model {
            id,
            name: "Trail Runner".to_string(),
            slug: "trail-runner".to_string(),
            description: None,
            short_description: None,
            sku: None,
            base_price: Decimal::new(8990, 2),
            track_quantity: true,
            allow_backorders: false,
            status: ProductStatus::Available,
            tags: vec![],
            category_id: Uuid::now_v7(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("shoe"), "%shoe%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_filter_condition_renders_ilike() {
        let filter = ProductFilter {
            min_price: Some(Decimal::from(10)),
            name_contains: Some("runner".to_string()),
            ..Default::default()
        };
        let sql = product::Entity::find()
            .filter(filter_condition(&filter))
            .build(DatabaseBackend::Postgres)
            .to_string();
        // `&str` so the inherent `str::contains` wins over the glob-imported `PgExpr::contains`
        let sql = sql.as_str();

        assert!(sql.contains("ILIKE '%runner%'"), "{sql}");
        assert!(sql.contains("\"base_price\" >= 10"), "{sql}");
    }

    #[tokio::test]
    async fn test_update_of_missing_product_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db, MissingChildPolicy::Reject);

        let result = repo
            .update(
                Uuid::now_v7(),
                UpdateProduct {
                    name: Some("Road Runner".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_by_id_assembles_children() {
        let id = Uuid::now_v7();
        let now = chrono::Utc::now();
        let image_row = image::Model {
            id: Uuid::now_v7(),
            product_id: id,
            url: "https://cdn.example.com/a.png".to_string(),
            alt: "Product Image".to_string(),
            thumbnail_url: "https://cdn.example.com/a-thumb.png".to_string(),
            display_order: 0,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_row(id)]])
            .append_query_results([vec![image_row]])
            .append_query_results([Vec::<model::Model>::new()])
            .append_query_results([Vec::<attribute_value::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db, MissingChildPolicy::Reject);

        let product = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(product.images.len(), 1);
        assert!(product.models.is_empty());
        assert!(product.attributes.is_empty());
    }
}
