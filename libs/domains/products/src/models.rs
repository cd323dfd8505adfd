use chrono::{DateTime, Utc};
use database::{Identified, OwnedChild, PageInfo};
use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u64 = 20;

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if !SLUG.is_match(slug) {
        return Err(validator::ValidationError::new("invalid_slug"));
    }
    Ok(())
}

/// Prices are non-negative with at most two fractional digits.
fn validate_price(price: &Decimal) -> Result<(), validator::ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(validator::ValidationError::new("negative_price"));
    }
    if price.normalize().scale() > 2 {
        return Err(validator::ValidationError::new("price_precision"));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_alt() -> String {
    "Product Image".to_string()
}

/// Sales status of a product
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "low_stock")]
    LowStock,
    #[sea_orm(string_value = "unavailable")]
    Unavailable,
    /// Shown on the storefront landing page
    #[sea_orm(string_value = "featured")]
    Featured,
}

/// Product with its images, 3D models and attribute values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub sku: Option<String>,
    pub base_price: Decimal,
    pub track_quantity: bool,
    pub allow_backorders: bool,
    pub status: ProductStatus,
    pub tags: Vec<String>,
    pub category_id: Uuid,
    pub images: Vec<ProductImage>,
    pub models: Vec<ProductModel>,
    pub attributes: Vec<ProductAttributeValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub alt: String,
    pub thumbnail_url: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A 3D model of the product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductModel {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Value of one of the category's attributes for this product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductAttributeValue {
    pub id: Uuid,
    pub product_id: Uuid,
    pub attribute_id: Uuid,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductImageInput {
    #[validate(url)]
    pub url: String,
    #[serde(default = "default_alt")]
    #[validate(length(max = 255))]
    pub alt: String,
    #[validate(url)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductModelInput {
    #[validate(url)]
    pub url: String,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductAttributeValueInput {
    /// A category attribute id
    pub attribute_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub value: String,
}

/// Image entry of a product patch. With `id` it changes only the fields it
/// names on that image; without one it adds an image and needs both urls.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_image"))]
pub struct ProductImagePatch {
    #[serde(default, deserialize_with = "database::reconcile::deserialize_optional_id")]
    pub id: Option<Uuid>,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(length(max = 255))]
    pub alt: Option<String>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    pub display_order: Option<i32>,
}

/// Model entry of a product patch; a new model needs `url`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_model"))]
pub struct ProductModelPatch {
    #[serde(default, deserialize_with = "database::reconcile::deserialize_optional_id")]
    pub id: Option<Uuid>,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    pub display_order: Option<i32>,
}

/// Attribute value entry of a product patch; a new value needs both fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_attribute_value"))]
pub struct ProductAttributeValuePatch {
    #[serde(default, deserialize_with = "database::reconcile::deserialize_optional_id")]
    pub id: Option<Uuid>,
    pub attribute_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub value: Option<String>,
}

fn validate_new_image(patch: &ProductImagePatch) -> Result<(), validator::ValidationError> {
    if patch.id.is_none() && (patch.url.is_none() || patch.thumbnail_url.is_none()) {
        return Err(validator::ValidationError::new("image_urls_required"));
    }
    Ok(())
}

fn validate_new_model(patch: &ProductModelPatch) -> Result<(), validator::ValidationError> {
    if patch.id.is_none() && patch.url.is_none() {
        return Err(validator::ValidationError::new("model_url_required"));
    }
    Ok(())
}

fn validate_new_attribute_value(
    patch: &ProductAttributeValuePatch,
) -> Result<(), validator::ValidationError> {
    if patch.id.is_none() && (patch.attribute_id.is_none() || patch.value.is_none()) {
        return Err(validator::ValidationError::new("attribute_value_required"));
    }
    Ok(())
}

impl ProductImagePatch {
    /// Full value set for a new image, with the create defaults filled in.
    pub fn into_input(self) -> ProductImageInput {
        ProductImageInput {
            url: self.url.unwrap_or_default(),
            alt: self.alt.unwrap_or_else(default_alt),
            thumbnail_url: self.thumbnail_url.unwrap_or_default(),
            display_order: self.display_order.unwrap_or_default(),
        }
    }
}

impl ProductModelPatch {
    pub fn into_input(self) -> ProductModelInput {
        ProductModelInput {
            url: self.url.unwrap_or_default(),
            thumbnail_url: self.thumbnail_url,
            display_order: self.display_order.unwrap_or_default(),
        }
    }
}

impl ProductAttributeValuePatch {
    pub fn into_input(self) -> ProductAttributeValueInput {
        ProductAttributeValueInput {
            attribute_id: self.attribute_id.unwrap_or_default(),
            value: self.value.unwrap_or_default(),
        }
    }
}

impl Identified for ProductImagePatch {
    fn identifier(&self) -> Option<Uuid> {
        self.id
    }
}

impl Identified for ProductModelPatch {
    fn identifier(&self) -> Option<Uuid> {
        self.id
    }
}

impl Identified for ProductAttributeValuePatch {
    fn identifier(&self) -> Option<Uuid> {
        self.id
    }
}

impl From<ProductImageInput> for ProductImagePatch {
    fn from(image: ProductImageInput) -> Self {
        Self {
            id: None,
            url: Some(image.url),
            alt: Some(image.alt),
            thumbnail_url: Some(image.thumbnail_url),
            display_order: Some(image.display_order),
        }
    }
}

impl From<ProductModelInput> for ProductModelPatch {
    fn from(model: ProductModelInput) -> Self {
        Self {
            id: None,
            url: Some(model.url),
            thumbnail_url: model.thumbnail_url,
            display_order: Some(model.display_order),
        }
    }
}

impl From<ProductAttributeValueInput> for ProductAttributeValuePatch {
    fn from(attribute: ProductAttributeValueInput) -> Self {
        Self {
            id: None,
            attribute_id: Some(attribute.attribute_id),
            value: Some(attribute.value),
        }
    }
}

/// DTO for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 150), custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub short_description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[schema(value_type = String, example = "19.99")]
    #[validate(custom(function = "validate_price"))]
    pub base_price: Decimal,
    #[serde(default = "default_true")]
    pub track_quantity: bool,
    #[serde(default)]
    pub allow_backorders: bool,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category_id: Uuid,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ProductImageInput>,
    #[serde(default)]
    #[validate(nested)]
    pub models: Vec<ProductModelInput>,
    #[serde(default)]
    #[validate(nested)]
    pub attributes: Vec<ProductAttributeValueInput>,
}

/// DTO for a partial product update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 3, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 150), custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub short_description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[schema(value_type = Option<String>, example = "24.50")]
    #[validate(custom(function = "validate_price"))]
    pub base_price: Option<Decimal>,
    pub track_quantity: Option<bool>,
    pub allow_backorders: Option<bool>,
    pub status: Option<ProductStatus>,
    pub tags: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
    #[validate(nested)]
    pub images: Option<Vec<ProductImagePatch>>,
    #[validate(nested)]
    pub models: Option<Vec<ProductModelPatch>>,
    #[validate(nested)]
    pub attributes: Option<Vec<ProductAttributeValuePatch>>,
}

impl UpdateProduct {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        !self.has_parent_changes()
            && self.images.is_none()
            && self.models.is_none()
            && self.attributes.is_none()
    }

    pub fn has_parent_changes(&self) -> bool {
        self.name.is_some()
            || self.slug.is_some()
            || self.description.is_some()
            || self.short_description.is_some()
            || self.sku.is_some()
            || self.base_price.is_some()
            || self.track_quantity.is_some()
            || self.allow_backorders.is_some()
            || self.status.is_some()
            || self.tags.is_some()
            || self.category_id.is_some()
    }
}

/// Query parameters for listing products
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 20, max 100)
    pub limit: Option<u64>,
    pub category_id: Option<Uuid>,
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring of the product name
    pub q: Option<String>,
}

/// Filters applied by the repository; paging is passed separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub name_contains: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.category_id.is_none_or(|id| product.category_id == id)
            && self.min_price.is_none_or(|min| product.base_price >= min)
            && self.max_price.is_none_or(|max| product.base_price <= max)
            && self.name_contains.as_deref().is_none_or(|q| {
                product.name.to_lowercase().contains(&q.to_lowercase())
            })
    }
}

impl From<&ProductListQuery> for ProductFilter {
    fn from(query: &ProductListQuery) -> Self {
        Self {
            category_id: query.category_id,
            min_price: query.min_price,
            max_price: query.max_price,
            name_contains: query
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPage {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items: Vec<Product>,
}

impl ProductPage {
    pub fn new(items: Vec<Product>, info: PageInfo) -> Self {
        Self {
            current_page: info.current_page,
            total_pages: info.total_pages,
            total_items: info.total_items,
            items,
        }
    }
}

impl Product {
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        let id = Uuid::now_v7();

        Self {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            short_description: input.short_description,
            sku: input.sku,
            base_price: input.base_price,
            track_quantity: input.track_quantity,
            allow_backorders: input.allow_backorders,
            status: input.status,
            tags: input.tags,
            category_id: input.category_id,
            images: input
                .images
                .into_iter()
                .map(|i| ProductImage::create(id, i.into()))
                .collect(),
            models: input
                .models
                .into_iter()
                .map(|m| ProductModel::create(id, m.into()))
                .collect(),
            attributes: input
                .attributes
                .into_iter()
                .map(|a| ProductAttributeValue::create(id, a.into()))
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the scalar part of a patch; child lists are reconciled separately.
    pub fn apply_update(&mut self, update: &UpdateProduct) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(slug) = &update.slug {
            self.slug = slug.clone();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(short_description) = &update.short_description {
            self.short_description = Some(short_description.clone());
        }
        if let Some(sku) = &update.sku {
            self.sku = Some(sku.clone());
        }
        if let Some(base_price) = update.base_price {
            self.base_price = base_price;
        }
        if let Some(track_quantity) = update.track_quantity {
            self.track_quantity = track_quantity;
        }
        if let Some(allow_backorders) = update.allow_backorders {
            self.allow_backorders = allow_backorders;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        self.updated_at = Utc::now();
    }
}

impl OwnedChild for ProductImage {
    type Patch = ProductImagePatch;
    const KIND: &'static str = "product image";

    fn id(&self) -> Uuid {
        self.id
    }

    fn overwrite(&mut self, patch: ProductImagePatch) {
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(alt) = patch.alt {
            self.alt = alt;
        }
        if let Some(thumbnail_url) = patch.thumbnail_url {
            self.thumbnail_url = thumbnail_url;
        }
        if let Some(display_order) = patch.display_order {
            self.display_order = display_order;
        }
        self.updated_at = Utc::now();
    }

    fn create(product_id: Uuid, patch: ProductImagePatch) -> Self {
        let now = Utc::now();
        let input = patch.into_input();
        Self {
            id: Uuid::now_v7(),
            product_id,
            url: input.url,
            alt: input.alt,
            thumbnail_url: input.thumbnail_url,
            display_order: input.display_order,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedChild for ProductModel {
    type Patch = ProductModelPatch;
    const KIND: &'static str = "product model";

    fn id(&self) -> Uuid {
        self.id
    }

    fn overwrite(&mut self, patch: ProductModelPatch) {
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(thumbnail_url) = patch.thumbnail_url {
            self.thumbnail_url = Some(thumbnail_url);
        }
        if let Some(display_order) = patch.display_order {
            self.display_order = display_order;
        }
        self.updated_at = Utc::now();
    }

    fn create(product_id: Uuid, patch: ProductModelPatch) -> Self {
        let now = Utc::now();
        let input = patch.into_input();
        Self {
            id: Uuid::now_v7(),
            product_id,
            url: input.url,
            thumbnail_url: input.thumbnail_url,
            display_order: input.display_order,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedChild for ProductAttributeValue {
    type Patch = ProductAttributeValuePatch;
    const KIND: &'static str = "product attribute value";

    fn id(&self) -> Uuid {
        self.id
    }

    fn overwrite(&mut self, patch: ProductAttributeValuePatch) {
        if let Some(attribute_id) = patch.attribute_id {
            self.attribute_id = attribute_id;
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        self.updated_at = Utc::now();
    }

    fn create(product_id: Uuid, patch: ProductAttributeValuePatch) -> Self {
        let now = Utc::now();
        let input = patch.into_input();
        Self {
            id: Uuid::now_v7(),
            product_id,
            attribute_id: input.attribute_id,
            value: input.value,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn create_payload() -> serde_json::Value {
        json!({
            "name": "Trail Runner",
            "slug": "trail-runner",
            "base_price": "89.90",
            "category_id": Uuid::now_v7(),
            "images": [{
                "url": "https://cdn.example.com/trail.png",
                "thumbnail_url": "https://cdn.example.com/trail-thumb.png"
            }]
        })
    }

    #[test]
    fn test_create_defaults() {
        let input: CreateProduct = serde_json::from_value(create_payload()).unwrap();
        assert!(input.validate().is_ok());
        assert!(input.track_quantity);
        assert!(!input.allow_backorders);
        assert_eq!(input.status, ProductStatus::Available);
        assert_eq!(input.images[0].alt, "Product Image");
        assert!(input.models.is_empty());
    }

    #[test]
    fn test_price_rules() {
        assert!(validate_price(&Decimal::from_str("0").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("19.99").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("19.990").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("19.999").unwrap()).is_err());
        assert!(validate_price(&Decimal::from_str("-1").unwrap()).is_err());
    }

    #[test]
    fn test_image_urls_are_checked() {
        let mut payload = create_payload();
        payload["images"][0]["url"] = json!("not a url");
        let input: CreateProduct = serde_json::from_value(payload).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_status_uses_snake_case() {
        let status: ProductStatus = serde_json::from_value(json!("low_stock")).unwrap();
        assert_eq!(status, ProductStatus::LowStock);
        assert_eq!(ProductStatus::from_str("featured").unwrap(), ProductStatus::Featured);
    }

    #[test]
    fn test_patch_entries_split_on_id() {
        let existing = Uuid::now_v7();
        let patch: UpdateProduct = serde_json::from_value(json!({
            "models": [
                {"id": existing, "url": "https://cdn.example.com/a.glb"},
                {"url": "https://cdn.example.com/b.glb"}
            ]
        }))
        .unwrap();

        let models = patch.models.as_ref().unwrap();
        assert_eq!(models[0].identifier(), Some(existing));
        assert_eq!(models[1].identifier(), None);
        assert!(!patch.has_parent_changes());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_new_patch_entries_need_their_required_fields() {
        let missing_thumbnail: UpdateProduct = serde_json::from_value(json!({
            "images": [{"url": "https://cdn.example.com/a.png"}]
        }))
        .unwrap();
        assert!(missing_thumbnail.validate().is_err());

        let missing_value: UpdateProduct = serde_json::from_value(json!({
            "attributes": [{"attribute_id": Uuid::now_v7()}]
        }))
        .unwrap();
        assert!(missing_value.validate().is_err());

        let reorder_only: UpdateProduct = serde_json::from_value(json!({
            "images": [{"id": Uuid::now_v7(), "display_order": 2}]
        }))
        .unwrap();
        assert!(reorder_only.validate().is_ok());
    }

    #[test]
    fn test_image_overwrite_keeps_unnamed_fields() {
        let mut input: CreateProduct = serde_json::from_value(create_payload()).unwrap();
        input.images[0].alt = "Side view".to_string();
        input.images[0].display_order = 4;
        let mut image = Product::new(input).images.remove(0);

        image.overwrite(ProductImagePatch {
            id: Some(image.id),
            url: Some("https://cdn.example.com/trail-v2.png".to_string()),
            ..Default::default()
        });

        assert_eq!(image.url, "https://cdn.example.com/trail-v2.png");
        assert_eq!(image.alt, "Side view");
        assert_eq!(image.thumbnail_url, "https://cdn.example.com/trail-thumb.png");
        assert_eq!(image.display_order, 4);
    }

    #[test]
    fn test_filter_from_query() {
        let category_id = Uuid::now_v7();
        let query = ProductListQuery {
            category_id: Some(category_id),
            q: Some("  ".to_string()),
            ..Default::default()
        };
        let filter = ProductFilter::from(&query);
        assert_eq!(filter.category_id, Some(category_id));
        assert_eq!(filter.name_contains, None);
    }

    #[test]
    fn test_filter_matches_price_range_and_name() {
        let mut input: CreateProduct = serde_json::from_value(create_payload()).unwrap();
        input.images.clear();
        let product = Product::new(input);

        let filter = ProductFilter {
            min_price: Some(Decimal::from(50)),
            max_price: Some(Decimal::from(90)),
            name_contains: Some("RUNNER".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&product));

        let too_cheap = ProductFilter {
            max_price: Some(Decimal::from(10)),
            ..Default::default()
        };
        assert!(!too_cheap.matches(&product));
    }
}
