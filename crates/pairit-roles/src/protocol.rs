//! The `updateRoles` notification, the only message of the protocol.
//!
//! Sent host → guests as JSON:
//!
//! ```json
//! { "roles": { "0": "Navigator", "3": "Driver", "9": "Mob" } }
//! ```
//!
//! Participant identities become stringified object keys.

use serde::{Deserialize, Serialize};

use crate::assignment::RoleAssignment;
use crate::order::ParticipantOrder;

/// Name under which the host shares the notification service.
pub const DEFAULT_SERVICE_NAME: &str = "pairit";

/// Notification event carrying a fresh assignment.
pub const UPDATE_ROLES_EVENT: &str = "updateRoles";

/// Payload of [`UPDATE_ROLES_EVENT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolesUpdate {
    pub roles: RoleAssignment,
}

impl RolesUpdate {
    /// Snapshot the current order.
    #[must_use]
    pub fn from_order(order: &ParticipantOrder) -> Self {
        Self {
            roles: order.assignment(),
        }
    }

    /// Encode as a JSON value for the notification channel.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Decode a payload received from the notification channel.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}
