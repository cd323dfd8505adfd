//! Stateless bearer-token authentication and role checks.
//!
//! Tokens are HS256 JWTs carrying the user id, email, roles and the
//! email-verified flag. Routers are guarded with [`require_roles`]:
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, Role, RoleGuard, require_roles};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let guard = RoleGuard::new(auth, [Role::Admin, Role::Manager]);
//!
//! let products = products_router
//!     .layer(axum::middleware::from_fn_with_state(guard, require_roles));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod role;
pub mod user;

pub use config::JwtConfig;
pub use jwt::{ACCESS_TOKEN_TTL, JwtAuth, JwtClaims};
pub use middleware::{RoleGuard, require_roles};
pub use role::Role;
pub use user::AuthUser;
