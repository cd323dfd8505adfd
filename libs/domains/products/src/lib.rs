//! Products Domain
//!
//! The product catalog. A product belongs to a category and owns three kinds
//! of children: images, 3D models and values for the category's attributes.
//!
//! ```text
//! handlers ─▶ ProductService ─▶ ProductRepository
//!                                 ├─ PgProductRepository (sea-orm, transactional)
//!                                 └─ InMemoryProductRepository
//! ```
//!
//! Creating or patching a product writes the parent row and every child list
//! in one transaction. In a patch, child entries with an `id` update that
//! child and entries without one are inserted; the three kinds are
//! reconciled concurrently.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, InMemoryProductRepository, ProductService};
//!
//! let service = ProductService::new(InMemoryProductRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use models::{
    CreateProduct, Product, ProductAttributeValue, ProductAttributeValueInput,
    ProductAttributeValuePatch, ProductFilter, ProductImage, ProductImageInput, ProductImagePatch,
    ProductListQuery, ProductModel, ProductModelInput, ProductModelPatch, ProductPage,
    ProductStatus, UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
