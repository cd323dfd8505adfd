use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{Category, CategoryAttribute, CreateCategory, UpdateCategory};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub logo: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_category(self, attributes: Vec<CategoryAttribute>) -> Category {
        Category {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            logo: self.logo,
            parent_id: self.parent_id,
            attributes,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn from_create(id: Uuid, input: &CreateCategory) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(id),
            name: Set(input.name.clone()),
            slug: Set(input.slug.clone()),
            description: Set(input.description.clone()),
            logo: Set(input.logo.clone()),
            parent_id: Set(input.parent_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    /// Mark the scalar fields present in `update` as changed.
    pub fn apply_update(&mut self, update: &UpdateCategory) {
        if let Some(name) = &update.name {
            self.name = Set(name.clone());
        }
        if let Some(slug) = &update.slug {
            self.slug = Set(slug.clone());
        }
        if let Some(description) = &update.description {
            self.description = Set(Some(description.clone()));
        }
        if let Some(logo) = &update.logo {
            self.logo = Set(Some(logo.clone()));
        }
        if let Some(parent_id) = update.parent_id {
            self.parent_id = Set(Some(parent_id));
        }
        self.updated_at = Set(chrono::Utc::now().into());
    }
}
