//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::PermissionNotFound | Self::RoleNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::AlreadyExists => StatusCode::CONFLICT,

            // 500 Internal Server Error
            Self::TransactionFailed
            | Self::DatabaseError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request: validation failures, duplicate codes, broken hierarchy
            Self::ValidationFailed
            | Self::PermissionCodeExists
            | Self::PermissionParentNotFound
            | Self::PermissionCycle
            | Self::RoleCodeExists => StatusCode::BAD_REQUEST,
        }
    }
}
