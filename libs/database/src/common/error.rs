/// Failures around the pool lifecycle. Queries inside repositories surface
/// `sea_orm::DbErr` directly.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    /// `/ready` probe failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}
