//! Input validation helpers
//!
//! Client-side checks run before an admin form is submitted, so that a
//! missing field never reaches the API.

use crate::error::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;

// ── Text length limits ──────────────────────────────────────────────

/// Drink titles, branch names
pub const MAX_NAME_LEN: usize = 200;

/// Branch codes (e.g. "MSB01")
pub const MAX_CODE_LEN: usize = 32;

/// Descriptions and order notes
pub const MAX_NOTE_LEN: usize = 500;

/// Passwords typed into the unlock prompt
pub const MAX_PASSWORD_LEN: usize = 128;

/// Image URLs
pub const MAX_URL_LEN: usize = 2048;

/// Highest unit price accepted by the menu form
pub const MAX_PRICE: i64 = 100_000;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a menu price: non-negative and below [`MAX_PRICE`].
pub fn validate_price(price: Decimal, field: &str) -> AppResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::with_message(
            ErrorCode::DrinkInvalidPrice,
            format!("{field} price must be non-negative, got {price}"),
        ));
    }
    if price > Decimal::from(MAX_PRICE) {
        return Err(AppError::with_message(
            ErrorCode::DrinkInvalidPrice,
            format!("{field} price exceeds maximum allowed ({MAX_PRICE}), got {price}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Latte", "title", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "title", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(33), "code", MAX_CODE_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "notes", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_price_bounds() {
        assert!(validate_price(Decimal::ZERO, "small").is_ok());
        assert!(validate_price(Decimal::new(455, 1), "small").is_ok());
        assert!(validate_price(Decimal::from(-5), "small").is_err());
        assert!(validate_price(Decimal::from(MAX_PRICE + 1), "large").is_err());
    }
}
