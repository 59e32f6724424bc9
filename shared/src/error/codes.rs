//! Error codes for the access control engine
//!
//! Codes are grouped by domain:
//! - 0xxx: General errors
//! - 2xxx: Permission errors
//! - 3xxx: Role errors
//! - 4xxx: Association errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare `u16` so callers in any language can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,

    // ==================== 2xxx: Permission ====================
    /// Permission not found
    PermissionNotFound = 2002,
    /// Permission code already used by a live permission
    PermissionCodeExists = 2003,
    /// Parent permission does not exist
    PermissionParentNotFound = 2004,
    /// Parent assignment would create a cycle
    PermissionCycle = 2005,

    // ==================== 3xxx: Role ====================
    /// Role not found
    RoleNotFound = 3001,
    /// Role code already used by a live role
    RoleCodeExists = 3002,

    // ==================== 4xxx: Association ====================
    /// Replace-all transaction failed and was rolled back
    TransactionFailed = 4001,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",

            // Permission
            ErrorCode::PermissionNotFound => "Permission not found",
            ErrorCode::PermissionCodeExists => "Permission code already exists",
            ErrorCode::PermissionParentNotFound => "Parent permission not found",
            ErrorCode::PermissionCycle => "Permission hierarchy would contain a cycle",

            // Role
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleCodeExists => "Role code already exists",

            // Association
            ErrorCode::TransactionFailed => "Transaction failed and was rolled back",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),

            2002 => Ok(ErrorCode::PermissionNotFound),
            2003 => Ok(ErrorCode::PermissionCodeExists),
            2004 => Ok(ErrorCode::PermissionParentNotFound),
            2005 => Ok(ErrorCode::PermissionCycle),

            3001 => Ok(ErrorCode::RoleNotFound),
            3002 => Ok(ErrorCode::RoleCodeExists),

            4001 => Ok(ErrorCode::TransactionFailed),

            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
