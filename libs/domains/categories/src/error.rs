use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::ReconcileError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category {0} not found")]
    NotFound(Uuid),

    #[error("No valid updates provided")]
    NoUpdates,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Category already exists: {0}")]
    Conflict(String),

    #[error("{0}")]
    ChildNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CategoryResult<T> = Result<T, CategoryError>;

impl From<DbErr> for CategoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::info!("Unique violation on categories: {}", detail);
                CategoryError::Conflict("a category with this name or slug exists".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::info!("Foreign key violation on categories: {}", detail);
                CategoryError::Validation("parent_id does not reference a category".to_string())
            }
            _ => CategoryError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<ReconcileError> for CategoryError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Db(e) => e.into(),
            missing @ ReconcileError::MissingChild { .. } => {
                CategoryError::ChildNotFound(missing.to_string())
            }
            duplicate @ ReconcileError::DuplicateChild { .. } => {
                CategoryError::Validation(duplicate.to_string())
            }
        }
    }
}

/// Convert CategoryError to AppError for standardized error responses
impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(id) => {
                tracing::debug!(category_id = %id, "Category not found");
                AppError::NotFound("Category not found".to_string())
            }
            CategoryError::NoUpdates => AppError::EmptyPatch,
            CategoryError::Validation(msg) => AppError::BadRequest(msg),
            CategoryError::Conflict(msg) => AppError::Conflict(msg),
            CategoryError::ChildNotFound(msg) => AppError::ChildNotFound(msg),
            CategoryError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
