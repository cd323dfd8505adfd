//! HTTP-level middleware: CORS and security headers.
//!
//! ```ignore
//! use axum_helpers::http::{cors_layer_from_origins, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(cors_layer_from_origins("http://localhost:3000")?);
//! ```

pub mod cors;
pub mod security;

pub use cors::cors_layer_from_origins;
pub use security::security_headers;
