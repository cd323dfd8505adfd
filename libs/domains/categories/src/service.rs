use database::PageRequest;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{
    Category, CategoryListQuery, CategoryPage, CreateCategory, DEFAULT_PAGE_SIZE, UpdateCategory,
};
use crate::repository::CategoryRepository;

/// Service layer for category business logic
#[derive(Clone)]
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a category together with its attribute definitions
    pub async fn create_category(&self, input: CreateCategory) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    pub async fn get_category(&self, id: Uuid) -> CategoryResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    pub async fn list_categories(&self, query: CategoryListQuery) -> CategoryResult<CategoryPage> {
        let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
        let (items, info) = self.repository.list(page).await?;
        Ok(CategoryPage::new(items, info))
    }

    /// Patch a category. Attributes with an id are overwritten, the rest are added.
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> CategoryResult<Category> {
        if input.is_empty() {
            return Err(CategoryError::NoUpdates);
        }

        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    pub async fn delete_category(&self, id: Uuid) -> CategoryResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(CategoryError::NotFound(id));
        }

        Ok(())
    }
}
