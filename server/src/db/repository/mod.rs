//! SQLite repositories
//!
//! Free functions over the shared pool, one module per entity, in the
//! style of `shift::close(&pool, ...)`. Writes that enforce an
//! invariant (single open cuadre) are single UPDATE/INSERT statements
//! guarded by their WHERE clause or a unique index - check-then-write
//! races lose at the database, not silently.

pub mod cuadre;
pub mod dining_table;
pub mod discount;
pub mod invoice;
pub mod order_archive;
pub mod payment_method;

use thiserror::Error;

use crate::utils::AppError;

/// Repository errors
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Cash session conflict: {0}")]
    SessionConflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Validation(msg),
            RepoError::SessionConflict(msg) => AppError::SessionConflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(e) => AppError::Database(e.to_string()),
            RepoError::Serialization(e) => AppError::Internal(e.to_string()),
        }
    }
}
