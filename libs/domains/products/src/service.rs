use database::PageRequest;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, DEFAULT_PAGE_SIZE, Product, ProductFilter, ProductListQuery, ProductPage,
    UpdateProduct,
};
use crate::repository::ProductRepository;

/// Service layer for product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a product with its images, models and attribute values
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// List products matching the query's filters, one page at a time
    pub async fn list_products(&self, query: ProductListQuery) -> ProductResult<ProductPage> {
        if matches!((query.min_price, query.max_price), (Some(min), Some(max)) if min > max) {
            return Err(ProductError::Validation(
                "min_price must not exceed max_price".to_string(),
            ));
        }

        let filter = ProductFilter::from(&query);
        let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
        let (items, info) = self.repository.list(filter, page).await?;
        Ok(ProductPage::new(items, info))
    }

    /// Patch a product and reconcile the child lists it carries
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        if input.is_empty() {
            return Err(ProductError::NoUpdates);
        }

        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(ProductError::NotFound(id));
        }

        Ok(())
    }
}
