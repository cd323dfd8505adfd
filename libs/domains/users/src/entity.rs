use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{UpdateUser, User};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub roles: Vec<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            phone: model.phone,
            roles: model.roles,
            email_verified: model.email_verified,
            phone_verified: model.phone_verified,
            image: model.image,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn apply_update(&mut self, update: &UpdateUser) {
        if let Some(name) = &update.name {
            self.name = Set(name.clone());
        }
        if let Some(phone) = &update.phone {
            let changed = self
                .phone
                .try_as_ref()
                .is_none_or(|current| current.as_deref() != Some(phone.as_str()));
            if changed {
                self.phone_verified = Set(false);
            }
            self.phone = Set(Some(phone.clone()));
        }
        if let Some(image) = &update.image {
            self.image = Set(Some(image.clone()));
        }
        self.updated_at = Set(chrono::Utc::now().into());
    }
}
