//! Shared application state.

use axum_helpers::JwtAuth;
use database::postgres::DatabaseConnection;

/// Handed to route builders at startup. Clones share the connection pool
/// and the verification keys.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: DatabaseConnection,
    pub jwt: JwtAuth,
}
