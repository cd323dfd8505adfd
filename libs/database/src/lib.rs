//! Database plumbing for the storefront services.
//!
//! - [`postgres`]: pool construction from [`postgres::PostgresConfig`], startup
//!   retry, migrations and the readiness probe
//! - [`repository`]: [`BaseRepository`], generic CRUD over a `Uuid`-keyed entity
//! - [`reconcile`]: transactional update-or-insert of parent-owned child rows
//! - [`pagination`]: page request normalization and page counts
//!
//! # Features
//!
//! - `postgres` (default): everything backed by sea-orm
//! - `config`: `core_config::FromEnv` for the config types

pub mod common;
pub mod pagination;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub mod reconcile;

#[cfg(feature = "postgres")]
pub mod repository;

pub use common::{DatabaseError, RetryConfig};
pub use pagination::{PageInfo, PageRequest};

#[cfg(feature = "postgres")]
pub use reconcile::{
    ChildStore, Identified, MissingChildPolicy, OwnedChild, Partitioned, ReconcileError, partition,
    reconcile, reconcile_in_memory,
};

#[cfg(feature = "postgres")]
pub use repository::{BaseRepository, UuidEntity};
