use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(Uuid),

    #[error("No valid updates provided")]
    NoUpdates,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("User already exists: {0}")]
    Conflict(String),

    /// The caller may not act on this account
    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<DbErr> for UserError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::info!("Unique violation on users: {}", detail);
                UserError::Conflict("a user with this email exists".to_string())
            }
            _ => UserError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => {
                tracing::debug!(user_id = %id, "User not found");
                AppError::NotFound("User not found".to_string())
            }
            UserError::NoUpdates => AppError::EmptyPatch,
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Conflict(msg) => AppError::Conflict(msg),
            UserError::Forbidden => AppError::Forbidden("Insufficient permissions".to_string()),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
