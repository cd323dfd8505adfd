use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{CategoryAttribute, CategoryAttributeInput, CategoryAttributePatch};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category_attributes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub attribute_name: String,
    pub attribute_type: String,
    pub is_required: bool,
    pub options: Vec<String>,
    pub display_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CategoryAttribute {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            attribute_name: model.attribute_name,
            attribute_type: model.attribute_type,
            is_required: model.is_required,
            options: model.options,
            display_order: model.display_order,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl ActiveModel {
    /// Only the fields the patch names; id and category_id stay `NotSet` so an
    /// `update_many().set(..)` can never move a row to another category.
    pub fn values(patch: &CategoryAttributePatch) -> Self {
        Self {
            id: NotSet,
            category_id: NotSet,
            attribute_name: patch.attribute_name.clone().map_or(NotSet, Set),
            attribute_type: patch.attribute_type.clone().map_or(NotSet, Set),
            is_required: patch.is_required.map_or(NotSet, Set),
            options: patch.options.clone().map_or(NotSet, Set),
            display_order: patch.display_order.map_or(NotSet, Set),
            created_at: NotSet,
            updated_at: Set(chrono::Utc::now().into()),
        }
    }

    pub fn new_row(category_id: Uuid, input: CategoryAttributeInput) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(Uuid::now_v7()),
            category_id: Set(category_id),
            attribute_name: Set(input.attribute_name),
            attribute_type: Set(input.attribute_type),
            is_required: Set(input.is_required),
            options: Set(input.options),
            display_order: Set(input.display_order),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
