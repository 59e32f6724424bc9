//! Input validation helpers
//!
//! Text length limits and checks shared by the permission and role stores.
//! SQLite TEXT has no built-in length enforcement.

use shared::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Permission / role codes
pub const MAX_CODE_LEN: usize = 128;

/// Display names
pub const MAX_NAME_LEN: usize = 200;

/// Remarks
pub const MAX_NOTE_LEN: usize = 500;

/// Route paths / URLs
pub const MAX_URL_LEN: usize = 2048;

/// Icon identifiers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Codes are non-empty, bounded, and contain no whitespace
pub fn validate_code(value: &str, field: &str) -> Result<(), AppError> {
    validate_required_text(value, field, MAX_CODE_LEN)?;
    if value.chars().any(char::is_whitespace) {
        return Err(
            AppError::validation(format!("{field} must not contain whitespace"))
                .with_detail("field", field),
        );
    }
    Ok(())
}
