//! Utility layer: error envelope, logging, validation

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResponse, ok};

/// Handler result alias
pub type AppResult<T> = Result<T, AppError>;
