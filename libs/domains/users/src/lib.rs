//! Users Domain
//!
//! Read and edit registered accounts. Accounts are created by whoever issues
//! the bearer tokens; this crate never stores credentials.
//!
//! Role checks live in the handlers and read the caller placed in request
//! extensions by [`axum_helpers::require_roles`].

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use models::{UpdateUser, User, UserListQuery, UserPage};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
