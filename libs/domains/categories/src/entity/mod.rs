//! Sea-ORM entities for the `categories` and `category_attributes` tables.

pub mod attribute;
pub mod category;
