//! Categories Domain
//!
//! Product categories and the attribute definitions products in them carry.
//!
//! ```text
//! handlers ─▶ CategoryService ─▶ CategoryRepository
//!                                  ├─ PgCategoryRepository (sea-orm, transactional)
//!                                  └─ InMemoryCategoryRepository
//! ```
//!
//! A `PATCH` may carry a list of attributes; entries with an `id` overwrite
//! that attribute of the category, entries without one are appended. See
//! [`database::reconcile`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_categories::{handlers, InMemoryCategoryRepository, CategoryService};
//!
//! let service = CategoryService::new(InMemoryCategoryRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CategoryError, CategoryResult};
pub use models::{
    Category, CategoryAttribute, CategoryAttributeInput, CategoryAttributePatch,
    CategoryListQuery, CategoryPage, CreateCategory, UpdateCategory,
};
pub use postgres::PgCategoryRepository;
pub use repository::{CategoryRepository, InMemoryCategoryRepository};
pub use service::CategoryService;
