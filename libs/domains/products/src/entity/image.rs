use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{ProductImage, ProductImageInput, ProductImagePatch};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub alt: String,
    #[sea_orm(column_type = "Text")]
    pub thumbnail_url: String,
    pub display_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ProductImage {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            url: model.url,
            alt: model.alt,
            thumbnail_url: model.thumbnail_url,
            display_order: model.display_order,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl ActiveModel {
    /// Fields named by the patch only; the key and the owning product are left `NotSet`.
    pub fn values(patch: &ProductImagePatch) -> Self {
        Self {
            id: NotSet,
            product_id: NotSet,
            url: patch.url.clone().map_or(NotSet, Set),
            alt: patch.alt.clone().map_or(NotSet, Set),
            thumbnail_url: patch.thumbnail_url.clone().map_or(NotSet, Set),
            display_order: patch.display_order.map_or(NotSet, Set),
            created_at: NotSet,
            updated_at: Set(chrono::Utc::now().into()),
        }
    }

    pub fn new_row(product_id: Uuid, input: ProductImageInput) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Set(Uuid::now_v7()),
            product_id: Set(product_id),
            url: Set(input.url),
            alt: Set(input.alt),
            thumbnail_url: Set(input.thumbnail_url),
            display_order: Set(input.display_order),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
