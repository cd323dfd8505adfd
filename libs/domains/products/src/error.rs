use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::ReconcileError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product {0} not found")]
    NotFound(Uuid),

    #[error("No valid updates provided")]
    NoUpdates,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Product already exists: {0}")]
    Conflict(String),

    #[error("{0}")]
    ChildNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::info!("Unique violation on products: {}", detail);
                ProductError::Conflict("a product with this slug or sku exists".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::info!("Foreign key violation on products: {}", detail);
                ProductError::Validation(
                    "category_id or attribute_id does not reference an existing record"
                        .to_string(),
                )
            }
            _ => ProductError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<ReconcileError> for ProductError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Db(e) => e.into(),
            missing @ ReconcileError::MissingChild { .. } => {
                ProductError::ChildNotFound(missing.to_string())
            }
            duplicate @ ReconcileError::DuplicateChild { .. } => {
                ProductError::Validation(duplicate.to_string())
            }
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => {
                tracing::debug!(product_id = %id, "Product not found");
                AppError::NotFound("Product not found".to_string())
            }
            ProductError::NoUpdates => AppError::EmptyPatch,
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Conflict(msg) => AppError::Conflict(msg),
            ProductError::ChildNotFound(msg) => AppError::ChildNotFound(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
