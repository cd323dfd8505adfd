use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{
    ProductAttributeValue, ProductAttributeValueInput, ProductAttributeValuePatch,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_attribute_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub attribute_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub value: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ProductAttributeValue {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            attribute_id: model.attribute_id,
            value: model.value,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn values(patch: &ProductAttributeValuePatch) -> Self {
        Self {
            id: NotSet,
            product_id: NotSet,
            attribute_id: patch.attribute_id.map_or(NotSet, Set),
            value: patch.value.clone().map_or(NotSet, Set),
            created_at: NotSet,
            updated_at: Set(chrono::Utc::now().into()),
        }
    }

    pub fn new_row(product_id: Uuid, input: ProductAttributeValueInput) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(Uuid::now_v7()),
            product_id: Set(product_id),
            attribute_id: Set(input.attribute_id),
            value: Set(input.value),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
