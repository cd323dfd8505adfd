use chrono::{DateTime, Utc};
use database::{Identified, OwnedChild, PageInfo};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Lowercase words joined by single hyphens
static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if !SLUG.is_match(slug) {
        return Err(validator::ValidationError::new("invalid_slug"));
    }
    Ok(())
}

fn default_attribute_type() -> String {
    "text".to_string()
}

/// Product category with its attribute definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Logo URL
    pub logo: Option<String>,
    /// Parent category, if this is a subcategory
    pub parent_id: Option<Uuid>,
    /// Attribute definitions in display order
    pub attributes: Vec<CategoryAttribute>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An attribute products in this category can carry (e.g. "color")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryAttribute {
    pub id: Uuid,
    pub category_id: Uuid,
    pub attribute_name: String,
    pub attribute_type: String,
    pub is_required: bool,
    pub options: Vec<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Value fields of a category attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryAttributeInput {
    #[validate(length(min = 2, max = 50))]
    pub attribute_name: String,
    #[serde(default = "default_attribute_type")]
    #[validate(length(min = 1, max = 50))]
    pub attribute_type: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub display_order: i32,
}

/// Attribute entry of a category patch. With `id` it changes only the fields
/// it names on that attribute; without one it creates a new attribute and
/// `attribute_name` is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_attribute"))]
pub struct CategoryAttributePatch {
    #[serde(default, deserialize_with = "database::reconcile::deserialize_optional_id")]
    pub id: Option<Uuid>,
    #[validate(length(min = 2, max = 50))]
    pub attribute_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub attribute_type: Option<String>,
    pub is_required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub display_order: Option<i32>,
}

fn validate_new_attribute(
    patch: &CategoryAttributePatch,
) -> Result<(), validator::ValidationError> {
    if patch.id.is_none() && patch.attribute_name.is_none() {
        return Err(validator::ValidationError::new("attribute_name_required"));
    }
    Ok(())
}

impl CategoryAttributePatch {
    /// Full value set for a new attribute, with the create defaults filled in.
    pub fn into_input(self) -> CategoryAttributeInput {
        CategoryAttributeInput {
            attribute_name: self.attribute_name.unwrap_or_default(),
            attribute_type: self.attribute_type.unwrap_or_else(default_attribute_type),
            is_required: self.is_required.unwrap_or_default(),
            options: self.options.unwrap_or_default(),
            display_order: self.display_order.unwrap_or_default(),
        }
    }
}

impl Identified for CategoryAttributePatch {
    fn identifier(&self) -> Option<Uuid> {
        self.id
    }
}

impl From<CategoryAttributeInput> for CategoryAttributePatch {
    fn from(input: CategoryAttributeInput) -> Self {
        Self {
            id: None,
            attribute_name: Some(input.attribute_name),
            attribute_type: Some(input.attribute_type),
            is_required: Some(input.is_required),
            options: Some(input.options),
            display_order: Some(input.display_order),
        }
    }
}

/// DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 3, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[validate(url)]
    pub logo: Option<String>,
    pub parent_id: Option<Uuid>,
    #[validate(length(min = 1), nested)]
    pub attributes: Vec<CategoryAttributeInput>,
}

/// DTO for a partial category update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 3, max = 50))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    #[validate(url)]
    pub logo: Option<String>,
    pub parent_id: Option<Uuid>,
    #[validate(nested)]
    pub attributes: Option<Vec<CategoryAttributePatch>>,
}

impl UpdateCategory {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        !self.has_parent_changes() && self.attributes.is_none()
    }

    pub fn has_parent_changes(&self) -> bool {
        self.name.is_some()
            || self.slug.is_some()
            || self.description.is_some()
            || self.logo.is_some()
            || self.parent_id.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 20, max 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryPage {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items: Vec<Category>,
}

impl CategoryPage {
    pub fn new(items: Vec<Category>, info: PageInfo) -> Self {
        Self {
            current_page: info.current_page,
            total_pages: info.total_pages,
            total_items: info.total_items,
            items,
        }
    }
}

impl Category {
    pub fn new(input: CreateCategory) -> Self {
        let now = Utc::now();
        let id = Uuid::now_v7();
        let attributes = input
            .attributes
            .into_iter()
            .map(|attribute| CategoryAttribute::create(id, attribute.into()))
            .collect();

        Self {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            logo: input.logo,
            parent_id: input.parent_id,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the scalar part of a patch; attributes are reconciled separately.
    pub fn apply_update(&mut self, update: &UpdateCategory) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(slug) = &update.slug {
            self.slug = slug.clone();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(logo) = &update.logo {
            self.logo = Some(logo.clone());
        }
        if let Some(parent_id) = update.parent_id {
            self.parent_id = Some(parent_id);
        }
        self.updated_at = Utc::now();
    }
}

impl OwnedChild for CategoryAttribute {
    type Patch = CategoryAttributePatch;
    const KIND: &'static str = "category attribute";

    fn id(&self) -> Uuid {
        self.id
    }

    fn overwrite(&mut self, patch: CategoryAttributePatch) {
        if let Some(attribute_name) = patch.attribute_name {
            self.attribute_name = attribute_name;
        }
        if let Some(attribute_type) = patch.attribute_type {
            self.attribute_type = attribute_type;
        }
        if let Some(is_required) = patch.is_required {
            self.is_required = is_required;
        }
        if let Some(options) = patch.options {
            self.options = options;
        }
        if let Some(display_order) = patch.display_order {
            self.display_order = display_order;
        }
        self.updated_at = Utc::now();
    }

    fn create(category_id: Uuid, patch: CategoryAttributePatch) -> Self {
        let now = Utc::now();
        let input = patch.into_input();
        Self {
            id: Uuid::now_v7(),
            category_id,
            attribute_name: input.attribute_name,
            attribute_type: input.attribute_type,
            is_required: input.is_required,
            options: input.options,
            display_order: input.display_order,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_payload() -> serde_json::Value {
        json!({
            "name": "Shoes",
            "slug": "shoes",
            "attributes": [{"attribute_name": "size"}]
        })
    }

    #[test]
    fn test_attribute_defaults() {
        let input: CategoryAttributeInput =
            serde_json::from_value(json!({"attribute_name": "color"})).unwrap();
        assert_eq!(input.attribute_type, "text");
        assert!(!input.is_required);
        assert!(input.options.is_empty());
        assert_eq!(input.display_order, 0);
    }

    #[test]
    fn test_create_requires_an_attribute() {
        let mut payload = create_payload();
        payload["attributes"] = json!([]);
        let input: CreateCategory = serde_json::from_value(payload).unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("attributes"));
    }

    #[test]
    fn test_create_rejects_bad_slug() {
        let mut payload = create_payload();
        payload["slug"] = json!("Not A Slug");
        let input: CreateCategory = serde_json::from_value(payload).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_nested_attribute_rules_apply() {
        let mut payload = create_payload();
        payload["attributes"] = json!([{"attribute_name": "x"}]);
        let input: CreateCategory = serde_json::from_value(payload).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_patch_with_blank_id_is_new() {
        let patch: CategoryAttributePatch =
            serde_json::from_value(json!({"id": "", "attribute_name": "material"})).unwrap();
        assert_eq!(patch.identifier(), None);
        assert_eq!(patch.attribute_name.as_deref(), Some("material"));
    }

    #[test]
    fn test_new_patch_entry_needs_a_name() {
        let update: UpdateCategory = serde_json::from_value(json!({
            "attributes": [{"attribute_type": "select"}]
        }))
        .unwrap();
        assert!(update.validate().is_err());

        let rename: UpdateCategory = serde_json::from_value(json!({
            "attributes": [{"id": Uuid::now_v7(), "display_order": 4}]
        }))
        .unwrap();
        assert!(rename.validate().is_ok());
    }

    #[test]
    fn test_overwrite_keeps_unnamed_fields() {
        let input: CreateCategory = serde_json::from_value(json!({
            "name": "Shirts",
            "slug": "shirts",
            "attributes": [{
                "attribute_name": "size",
                "attribute_type": "select",
                "is_required": true,
                "options": ["S", "M", "L"],
                "display_order": 3
            }]
        }))
        .unwrap();
        let mut attribute = Category::new(input).attributes.remove(0);

        attribute.overwrite(CategoryAttributePatch {
            id: Some(attribute.id),
            attribute_name: Some("Size".to_string()),
            ..Default::default()
        });

        assert_eq!(attribute.attribute_name, "Size");
        assert_eq!(attribute.attribute_type, "select");
        assert!(attribute.is_required);
        assert_eq!(attribute.options, vec!["S", "M", "L"]);
        assert_eq!(attribute.display_order, 3);
    }

    #[test]
    fn test_empty_update_detection() {
        assert!(UpdateCategory::default().is_empty());

        let attributes_only = UpdateCategory {
            attributes: Some(vec![]),
            ..Default::default()
        };
        assert!(!attributes_only.is_empty());
        assert!(!attributes_only.has_parent_changes());
    }

    #[test]
    fn test_new_category_owns_its_attributes() {
        let input: CreateCategory = serde_json::from_value(create_payload()).unwrap();
        let category = Category::new(input);
        assert_eq!(category.attributes.len(), 1);
        assert_eq!(category.attributes[0].category_id, category.id);
    }
}
