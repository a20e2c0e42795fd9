//! Access level enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level carried by a grant.
///
/// Declared low to high, so the derived `Ord` ranks `View < Download < Manage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// May see the resource in listings and open it.
    View,
    /// May also download the bytes.
    Download,
    /// Full control, including sharing and deleting.
    Manage,
}

impl AccessLevel {
    /// Check if this level grants at least the given level.
    pub fn has_at_least(&self, required: AccessLevel) -> bool {
        *self >= required
    }

    /// Check if this level allows downloading.
    pub fn can_download(&self) -> bool {
        matches!(self, Self::Download | Self::Manage)
    }

    /// Check if this level allows sharing, renaming, and deleting.
    pub fn can_manage(&self) -> bool {
        matches!(self, Self::Manage)
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
            Self::Manage => "manage",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = canopy_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "download" => Ok(Self::Download),
            "manage" => Ok(Self::Manage),
            _ => Err(canopy_core::AppError::validation(format!(
                "Invalid access level: '{s}'"
            ))),
        }
    }
}
