//! Grant-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{GrantId, PrincipalId};

/// Events related to sharing and revoking access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GrantEvent {
    /// A grant row was added.
    Shared {
        /// The grant ID.
        grant_id: GrantId,
        /// The principal receiving access.
        principal_id: PrincipalId,
        /// The resource kind (`container` or `leaf`).
        resource_type: String,
        /// The resource ID.
        resource_id: Uuid,
        /// The access level granted.
        access: String,
    },
    /// Grant rows were removed.
    Revoked {
        /// The resource kind.
        resource_type: String,
        /// The resource ID.
        resource_id: Uuid,
        /// Number of rows removed.
        removed: usize,
    },
}
