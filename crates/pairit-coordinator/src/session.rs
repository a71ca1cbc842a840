//! Contract with the host session layer.
//!
//! The coordinator never talks to a transport directly. It needs exactly four
//! things from the session it runs in:
//!
//! - role changes (none / host / guest), delivered as [`SessionEvent`]s
//! - peer join/leave with stable numeric identities, also as [`SessionEvent`]s
//! - a host → guests notification channel ([`HostService`] / [`GuestService`])
//! - the identity of the local participant ([`SessionApi::local_identity`])

use std::future::Future;

use pairit_roles::ParticipantId;
use tokio::sync::mpsc;

/// Role of the local process in the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionRole {
    /// Not in a session.
    None,
    /// Sharing the session; owns the participant order.
    Host,
    /// Joined someone else's session.
    Guest,
}

impl std::fmt::Display for SessionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Host => write!(f, "host"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

/// Peers that joined or left since the last change event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeersChange {
    pub added: Vec<ParticipantId>,
    pub removed: Vec<ParticipantId>,
}

impl PeersChange {
    /// A change where only `peers` joined.
    #[must_use]
    pub fn joined(peers: impl IntoIterator<Item = ParticipantId>) -> Self {
        Self {
            added: peers.into_iter().collect(),
            removed: Vec::new(),
        }
    }

    /// A change where only `peers` left.
    #[must_use]
    pub fn left(peers: impl IntoIterator<Item = ParticipantId>) -> Self {
        Self {
            added: Vec::new(),
            removed: peers.into_iter().collect(),
        }
    }
}

/// Events the session layer feeds into the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RoleChanged(SessionRole),
    PeersChanged(PeersChange),
}

/// Sending side of the shared notification service, held by the host.
pub trait HostService: Send + 'static {
    /// Best-effort broadcast of `payload` to every attached guest.
    fn notify(&self, event: &str, payload: serde_json::Value);
}

/// Receiving side of the shared notification service, held by a guest.
pub trait GuestService: Send + 'static {
    /// Subscribe to `event`. Each broadcast arrives once on the returned receiver.
    fn on_notify(&self, event: &str) -> mpsc::UnboundedReceiver<serde_json::Value>;
}

/// Handle to the session API of the local process.
pub trait SessionApi: Send + Sync + 'static {
    type Host: HostService;
    type Guest: GuestService;

    /// Stable identity of this process within the session.
    fn local_identity(&self) -> ParticipantId;

    /// Share a named service with guests. `None` if the session refuses.
    fn share_service(&self, name: &str) -> impl Future<Output = Option<Self::Host>> + Send;

    /// Look up a service shared by the host. `None` if it is not (yet) published.
    fn shared_service(&self, name: &str) -> impl Future<Output = Option<Self::Guest>> + Send;
}
