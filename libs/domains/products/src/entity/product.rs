use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{
    CreateProduct, Product, ProductAttributeValue, ProductImage, ProductModel, ProductStatus,
    UpdateProduct,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub short_description: Option<String>,
    #[sea_orm(unique, nullable)]
    pub sku: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub base_price: Decimal,
    pub track_quantity: bool,
    pub allow_backorders: bool,
    pub status: ProductStatus,
    pub tags: Vec<String>,
    pub category_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Children loaded alongside a product row.
#[derive(Debug, Default)]
pub struct Children {
    pub images: Vec<ProductImage>,
    pub models: Vec<ProductModel>,
    pub attributes: Vec<ProductAttributeValue>,
}

impl Model {
    pub fn into_product(self, children: Children) -> Product {
        Product {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            short_description: self.short_description,
            sku: self.sku,
            base_price: self.base_price,
            track_quantity: self.track_quantity,
            allow_backorders: self.allow_backorders,
            status: self.status,
            tags: self.tags,
            category_id: self.category_id,
            images: children.images,
            models: children.models,
            attributes: children.attributes,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn from_create(id: Uuid, input: &CreateProduct) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(id),
            name: Set(input.name.clone()),
            slug: Set(input.slug.clone()),
            description: Set(input.description.clone()),
            short_description: Set(input.short_description.clone()),
            sku: Set(input.sku.clone()),
            base_price: Set(input.base_price),
            track_quantity: Set(input.track_quantity),
            allow_backorders: Set(input.allow_backorders),
            status: Set(input.status),
            tags: Set(input.tags.clone()),
            category_id: Set(input.category_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    /// Mark the scalar fields present in `update` as changed.
    pub fn apply_update(&mut self, update: &UpdateProduct) {
        if let Some(name) = &update.name {
            self.name = Set(name.clone());
        }
        if let Some(slug) = &update.slug {
            self.slug = Set(slug.clone());
        }
        if let Some(description) = &update.description {
            self.description = Set(Some(description.clone()));
        }
        if let Some(short_description) = &update.short_description {
            self.short_description = Set(Some(short_description.clone()));
        }
        if let Some(sku) = &update.sku {
            self.sku = Set(Some(sku.clone()));
        }
        if let Some(base_price) = update.base_price {
            self.base_price = Set(base_price);
        }
        if let Some(track_quantity) = update.track_quantity {
            self.track_quantity = Set(track_quantity);
        }
        if let Some(allow_backorders) = update.allow_backorders {
            self.allow_backorders = Set(allow_backorders);
        }
        if let Some(status) = update.status {
            self.status = Set(status);
        }
        if let Some(tags) = &update.tags {
            self.tags = Set(tags.clone());
        }
        if let Some(category_id) = update.category_id {
            self.category_id = Set(category_id);
        }
        self.updated_at = Set(chrono::Utc::now().into());
    }
}
