//! Input validation helpers

use super::error::AppError;
use crate::utils::AppResult;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_NOTE_LEN: usize = 500;

/// Validate a cash amount is finite and non-negative
pub fn validate_cash(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate a required text field (non-empty, bounded length)
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if trimmed.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum length of {max_len}"
        )));
    }
    Ok(())
}

/// Validate an optional text field (bounded length when present)
pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum length of {max_len}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cash_rejects_nan_and_negative() {
        assert!(validate_cash(f64::NAN, "saldo").is_err());
        assert!(validate_cash(f64::INFINITY, "saldo").is_err());
        assert!(validate_cash(-0.01, "saldo").is_err());
        assert!(validate_cash(0.0, "saldo").is_ok());
        assert!(validate_cash(50_000.0, "saldo").is_ok());
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("", "name", 10).is_err());
        assert!(validate_required_text("   ", "name", 10).is_err());
        assert!(validate_required_text("mesa 1", "name", 10).is_ok());
        assert!(validate_required_text("nombre demasiado largo", "name", 10).is_err());
    }
}
