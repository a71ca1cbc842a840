//! Error types for pairit-coordinator.

use thiserror::Error;

use crate::session::SessionRole;

/// Result type for pairit-coordinator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while coordinating role rotation.
///
/// Every variant is terminal for the current session. A later role-change
/// event starts again from clean state.
#[derive(Debug, Error)]
pub enum Error {
    /// The session API could not be acquired at startup.
    #[error("session API unavailable")]
    SessionUnavailable,

    /// The host could not share, or the guest could not find, the notification service.
    #[error("shared service `{service}` unavailable for {role} role")]
    ServiceUnavailable { service: String, role: SessionRole },

    /// A configuration value could not be parsed or is out of range.
    #[error("invalid configuration: {key}={value:?}")]
    InvalidConfig { key: &'static str, value: String },

    /// An `updateRoles` payload could not be encoded or decoded.
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}
