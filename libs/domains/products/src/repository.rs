use async_trait::async_trait;
use database::{MissingChildPolicy, PageInfo, PageRequest, reconcile_in_memory};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product together with its images, models and attribute values
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Filtered products, newest first
    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> ProductResult<(Vec<Product>, PageInfo)>;

    /// Apply scalar changes and reconcile every child list named in `input`
    /// as one unit of work
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Category and attribute ids are taken on trust; only the Postgres
/// implementation enforces those references.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
    policy: MissingChildPolicy,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MissingChildPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    fn ensure_unique(
        products: &HashMap<Uuid, Product>,
        id: Option<Uuid>,
        slug: Option<&str>,
        sku: Option<&str>,
    ) -> ProductResult<()> {
        let clash = products.values().any(|p| {
            Some(p.id) != id
                && (slug.is_some_and(|s| p.slug == s)
                    || sku.is_some_and(|s| p.sku.as_deref() == Some(s)))
        });
        if clash {
            return Err(ProductError::Conflict(
                "a product with this slug or sku exists".to_string(),
            ));
        }
        Ok(())
    }
}

fn sort_children(product: &mut Product) {
    product.images.sort_by_key(|i| i.display_order);
    product.models.sort_by_key(|m| m.display_order);
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        Self::ensure_unique(&products, None, Some(&input.slug), input.sku.as_deref())?;

        let mut product = Product::new(input);
        sort_children(&mut product);
        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> ProductResult<(Vec<Product>, PageInfo)> {
        let products = self.products.read().await;

        let mut matching: Vec<Product> = products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let info = PageInfo::new(page, matching.len() as u64);
        Ok((page.slice(&matching), info))
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        Self::ensure_unique(
            &products,
            Some(id),
            input.slug.as_deref(),
            input.sku.as_deref(),
        )?;

        // Work on a copy so a rejected child patch leaves the stored row as it was.
        let mut product = products
            .get(&id)
            .cloned()
            .ok_or(ProductError::NotFound(id))?;

        product.apply_update(&input);
        if let Some(images) = input.images {
            reconcile_in_memory(&mut product.images, id, images, self.policy)?;
        }
        if let Some(models) = input.models {
            reconcile_in_memory(&mut product.models, id, models, self.policy)?;
        }
        if let Some(attributes) = input.attributes {
            reconcile_in_memory(&mut product.attributes, id, attributes, self.policy)?;
        }
        sort_children(&mut product);

        products.insert(id, product.clone());

        tracing::info!(product_id = %id, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;

        if products.remove(&id).is_some() {
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
    use crate::models::{ProductImageInput, ProductImagePatch, ProductStatus};
    use rust_decimal::Decimal;

    fn image(url: &str, order: i32) -> ProductImageInput {
        ProductImageInput {
            url: url.to_string(),
            alt: "Product Image".to_string(),
            thumbnail_url: format!("{url}?thumb"),
            display_order: order,
        }
    }

    fn create_input(slug: &str) -> CreateProduct {
        CreateProduct {
            name: "Trail Runner".to_string(),
            slug: slug.to_string(),
            description: None,
            short_description: None,
            sku: None,
            base_price: Decimal::new(8990, 2),
            track_quantity: true,
            allow_backorders: false,
            status: ProductStatus::Available,
            tags: vec![],
            category_id: Uuid::now_v7(),
            images: vec![image("https://cdn.example.com/a.png", 0)],
            models: vec![],
            attributes: vec![],
        }
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_conflict() {
        let repo = InMemoryProductRepository::new();
        let mut first = create_input("first");
        first.sku = Some("TR-1".to_string());
        repo.create(first).await.unwrap();

        let mut second = create_input("second");
        second.sku = Some("TR-1".to_string());
        let result = repo.create(second).await;
        assert!(matches!(result, Err(ProductError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_mixed_image_patch() {
        let repo = InMemoryProductRepository::new();
        let product = repo.create(create_input("runner")).await.unwrap();
        let existing = product.images[0].id;

        let updated = repo
            .update(
                product.id,
                UpdateProduct {
                    images: Some(vec![
                        ProductImagePatch {
                            id: Some(existing),
                            ..ProductImagePatch::from(image("https://cdn.example.com/x.png", 0))
                        },
                        image("https://cdn.example.com/y.png", 1).into(),
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.images.len(), 2);
        assert_eq!(updated.images[0].id, existing);
        assert_eq!(updated.images[0].url, "https://cdn.example.com/x.png");
        assert_eq!(updated.images[1].url, "https://cdn.example.com/y.png");
    }

    #[tokio::test]
    async fn test_rejected_patch_leaves_product_unchanged() {
        let repo = InMemoryProductRepository::new();
        let product = repo.create(create_input("runner")).await.unwrap();

        let result = repo
            .update(
                product.id,
                UpdateProduct {
                    name: Some("Renamed".to_string()),
                    images: Some(vec![ProductImagePatch {
                        id: Some(Uuid::now_v7()),
                        ..ProductImagePatch::from(image("https://cdn.example.com/x.png", 0))
                    }]),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ProductError::ChildNotFound(_))));

        let stored = repo.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stored, product);
    }

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let repo = InMemoryProductRepository::new();
        let wanted = repo.create(create_input("wanted")).await.unwrap();
        repo.create(create_input("other")).await.unwrap();

        let filter = ProductFilter {
            category_id: Some(wanted.category_id),
            ..Default::default()
        };
        let (items, info) = repo
            .list(filter, PageRequest::new(None, None, 20))
            .await
            .unwrap();

        assert_eq!(info.total_items, 1);
        assert_eq!(items[0].id, wanted.id);
    }
}
