//! # Axum Helpers
//!
//! Shared HTTP plumbing for the shop API and its domain routers.
//!
//! ## Modules
//!
//! - **[`auth`]**: stateless JWT verification and role guards
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: UUID path and validated JSON extractors

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    ACCESS_TOKEN_TTL, AuthUser, JwtAuth, JwtClaims, JwtConfig, Role, RoleGuard, require_roles,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ReadyResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_origins, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};
