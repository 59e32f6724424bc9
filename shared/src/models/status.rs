//! Status Model

use serde::{Deserialize, Serialize};

/// Enabled / disabled switch shared by permissions and roles.
///
/// Stored as INTEGER (`1` enabled, `0` disabled).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[repr(i32)]
pub enum Status {
    Disabled = 0,
    #[default]
    Enabled = 1,
}

impl Status {
    pub fn is_enabled(self) -> bool {
        self == Status::Enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_and_serde() {
        assert_eq!(Status::default(), Status::Enabled);
        assert!(Status::Enabled.is_enabled());
        assert!(!Status::Disabled.is_enabled());
        assert_eq!(serde_json::to_string(&Status::Disabled).unwrap(), "\"disabled\"");
        let s: Status = serde_json::from_str("\"enabled\"").unwrap();
        assert_eq!(s, Status::Enabled);
    }
}
