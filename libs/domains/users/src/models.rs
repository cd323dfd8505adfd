use chrono::{DateTime, Utc};
use database::PageInfo;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Optional leading `+`, then 7 to 15 digits
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("valid phone regex"));

fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if !PHONE.is_match(phone) {
        return Err(validator::ValidationError::new("invalid_phone"));
    }
    Ok(())
}

/// A registered account. Accounts are created by the identity provider
/// that issues bearer tokens; this service reads and edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub roles: Vec<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    /// Avatar URL
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A verified account with the given roles, for seeding repositories.
    pub fn new(email: impl Into<String>, name: impl Into<String>, roles: &[&str]) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            name: name.into(),
            phone: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            email_verified: true,
            phone_verified: false,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: &UpdateUser) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            if self.phone.as_ref() != Some(phone) {
                self.phone_verified = false;
            }
            self.phone = Some(phone.clone());
        }
        if let Some(image) = &update.image {
            self.image = Some(image.clone());
        }
        self.updated_at = Utc::now();
    }
}

/// DTO for updating a user's profile
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.image.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 10, max 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPage {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items: Vec<User>,
}

impl UserPage {
    pub fn new(items: Vec<User>, info: PageInfo) -> Self {
        Self {
            current_page: info.current_page,
            total_pages: info.total_pages,
            total_items: info.total_items,
            items,
        }
    }
}
