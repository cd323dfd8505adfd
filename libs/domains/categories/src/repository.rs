use async_trait::async_trait;
use database::{MissingChildPolicy, PageInfo, PageRequest, reconcile_in_memory};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CreateCategory, UpdateCategory};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a category together with its attributes
    async fn create(&self, input: CreateCategory) -> CategoryResult<Category>;

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>>;

    /// Newest first
    async fn list(&self, page: PageRequest) -> CategoryResult<(Vec<Category>, PageInfo)>;

    /// Apply scalar changes and reconcile attributes in one unit of work
    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> CategoryResult<bool>;
}

/// In-memory implementation of CategoryRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
    policy: MissingChildPolicy,
}

impl InMemoryCategoryRepository {
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
        categories: &HashMap<Uuid, Category>,
        id: Option<Uuid>,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> CategoryResult<()> {
        let clash = categories.values().any(|c| {
            Some(c.id) != id
                && (name.is_some_and(|n| c.name == n) || slug.is_some_and(|s| c.slug == s))
        });
        if clash {
            return Err(CategoryError::Conflict(
                "a category with this name or slug exists".to_string(),
            ));
        }
        Ok(())
    }
}

fn sort_attributes(category: &mut Category) {
    category.attributes.sort_by_key(|a| a.display_order);
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, input: CreateCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;
        Self::ensure_unique(&categories, None, Some(&input.name), Some(&input.slug))?;

        let mut category = Category::new(input);
        sort_attributes(&mut category);
        categories.insert(category.id, category.clone());

        tracing::info!(category_id = %category.id, "Created category");
        Ok(category)
    }

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id).cloned())
    }

    async fn list(&self, page: PageRequest) -> CategoryResult<(Vec<Category>, PageInfo)> {
        let categories = self.categories.read().await;

        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let info = PageInfo::new(page, all.len() as u64);
        Ok((page.slice(&all), info))
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;

        Self::ensure_unique(
            &categories,
            Some(id),
            input.name.as_deref(),
            input.slug.as_deref(),
        )?;

        // Work on a copy so a rejected attribute patch leaves the stored row as it was.
        let mut category = categories
            .get(&id)
            .cloned()
            .ok_or(CategoryError::NotFound(id))?;

        category.apply_update(&input);
        if let Some(attributes) = input.attributes {
            reconcile_in_memory(&mut category.attributes, id, attributes, self.policy)?;
            sort_attributes(&mut category);
        }

        categories.insert(id, category.clone());

        tracing::info!(category_id = %id, "Updated category");
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> CategoryResult<bool> {
        let mut categories = self.categories.write().await;

        if categories.remove(&id).is_some() {
            tracing::info!(category_id = %id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryAttributeInput, CategoryAttributePatch};

    fn attribute(name: &str, order: i32) -> CategoryAttributeInput {
        CategoryAttributeInput {
            attribute_name: name.to_string(),
            attribute_type: "text".to_string(),
            is_required: false,
            options: vec![],
            display_order: order,
        }
    }

    fn create_input(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            logo: None,
            parent_id: None,
            attributes: vec![attribute("color", 0)],
        }
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let repo = InMemoryCategoryRepository::new();

        let category = repo.create(create_input("Shoes")).await.unwrap();
        assert_eq!(category.attributes.len(), 1);

        let fetched = repo.get_by_id(category.id).await.unwrap().unwrap();
        assert_eq!(fetched, category);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict() {
        let repo = InMemoryCategoryRepository::new();
        repo.create(create_input("Shoes")).await.unwrap();

        let mut input = create_input("Sneakers");
        input.slug = "shoes".to_string();
        let result = repo.create(input).await;
        assert!(matches!(result, Err(CategoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_reconciles_attributes() {
        let repo = InMemoryCategoryRepository::new();
        let category = repo.create(create_input("Shoes")).await.unwrap();
        let color = category.attributes[0].clone();

        let updated = repo
            .update(
                category.id,
                UpdateCategory {
                    attributes: Some(vec![
                        CategoryAttributePatch {
                            id: Some(color.id),
                            ..CategoryAttributePatch::from(attribute("colour", 1))
                        },
                        attribute("size", 0).into(),
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let names: Vec<&str> = updated
            .attributes
            .iter()
            .map(|a| a.attribute_name.as_str())
            .collect();
        assert_eq!(names, vec!["size", "colour"]);
        assert_eq!(updated.attributes[1].id, color.id);
    }

    #[tokio::test]
    async fn test_rejected_patch_changes_nothing() {
        let repo = InMemoryCategoryRepository::new();
        let category = repo.create(create_input("Shoes")).await.unwrap();

        let result = repo
            .update(
                category.id,
                UpdateCategory {
                    name: Some("Boots".to_string()),
                    attributes: Some(vec![CategoryAttributePatch {
                        id: Some(Uuid::now_v7()),
                        ..CategoryAttributePatch::from(attribute("ghost", 0))
                    }]),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(CategoryError::ChildNotFound(_))));
        let stored = repo.get_by_id(category.id).await.unwrap().unwrap();
        assert_eq!(stored, category);
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let repo = InMemoryCategoryRepository::new();
        let result = repo
            .update(
                Uuid::now_v7(),
                UpdateCategory {
                    name: Some("Anything".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(CategoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_pages() {
        let repo = InMemoryCategoryRepository::new();
        for name in ["Alpha", "Bravo", "Charlie"] {
            repo.create(create_input(name)).await.unwrap();
        }

        let (items, info) = repo.list(PageRequest::new(Some(2), Some(2), 20)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(info.total_items, 3);
        assert_eq!(info.total_pages, 2);
        assert_eq!(info.current_page, 2);
    }
}
