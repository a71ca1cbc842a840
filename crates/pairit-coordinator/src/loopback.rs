//! In-process session for tests and the simulator.
//!
//! A [`LoopbackHub`] stands in for the session layer: every [`LoopbackPeer`]
//! created from the same hub sees the services shared by the others. Shared
//! services are `tokio::sync::broadcast` channels, so every attached guest
//! receives every notification sent after it subscribed.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pairit_roles::ParticipantId;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::session::{GuestService, HostService, SessionApi};

const SERVICE_CAPACITY: usize = 64;

/// Notifications kept per service for [`LoopbackHub::history`].
pub const HISTORY_LIMIT: usize = 256;

/// One notification sent through a shared service.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Default)]
struct HubState {
    services: HashMap<String, broadcast::Sender<Notification>>,
    history: HashMap<String, VecDeque<Notification>>,
    sent: HashMap<String, usize>,
    sharing_disabled: bool,
}

/// Shared registry of published services.
#[derive(Debug, Clone, Default)]
pub struct LoopbackHub {
    inner: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    /// Create an empty hub with no shared services.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session API handle for one participant.
    #[must_use]
    pub fn peer(&self, identity: ParticipantId) -> LoopbackPeer {
        LoopbackPeer {
            hub: self.clone(),
            identity,
        }
    }

    /// Make every later `share_service` call fail.
    pub fn disable_sharing(&self) {
        self.state().sharing_disabled = true;
    }

    /// Check whether a service is currently published.
    #[must_use]
    pub fn is_shared(&self, name: &str) -> bool {
        self.state().services.contains_key(name)
    }

    /// The last [`HISTORY_LIMIT`] notifications sent through `name`, oldest first.
    #[must_use]
    pub fn history(&self, name: &str) -> Vec<Notification> {
        self.state()
            .history
            .get(name)
            .map(|kept| kept.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Total notifications sent through `name`, including ones no longer
    /// kept in the history.
    #[must_use]
    pub fn sent_count(&self, name: &str) -> usize {
        self.state().sent.get(name).copied().unwrap_or(0)
    }

    fn state(&self) -> MutexGuard<'_, HubState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn share(&self, name: &str) -> Option<LoopbackHostService> {
        let mut state = self.state();
        if state.sharing_disabled {
            debug!(service = name, "Refusing to share service");
            return None;
        }
        let (tx, _) = broadcast::channel(SERVICE_CAPACITY);
        state.services.insert(name.to_string(), tx.clone());
        Some(LoopbackHostService {
            hub: self.clone(),
            name: name.to_string(),
            tx,
        })
    }

    fn lookup(&self, name: &str) -> Option<LoopbackGuestService> {
        self.state()
            .services
            .get(name)
            .map(|tx| LoopbackGuestService { rx: tx.subscribe() })
    }

    fn record(&self, name: &str, notification: Notification) {
        let mut state = self.state();
        *state.sent.entry(name.to_string()).or_default() += 1;
        let kept = state.history.entry(name.to_string()).or_default();
        if kept.len() == HISTORY_LIMIT {
            kept.pop_front();
        }
        kept.push_back(notification);
    }

    fn unshare(&self, name: &str, tx: &broadcast::Sender<Notification>) {
        let mut state = self.state();
        if state.services.get(name).is_some_and(|current| current.same_channel(tx)) {
            state.services.remove(name);
        }
    }
}

/// Session API of one loopback participant.
#[derive(Debug, Clone)]
pub struct LoopbackPeer {
    hub: LoopbackHub,
    identity: ParticipantId,
}

impl SessionApi for LoopbackPeer {
    type Host = LoopbackHostService;
    type Guest = LoopbackGuestService;

    fn local_identity(&self) -> ParticipantId {
        self.identity
    }

    fn share_service(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Option<Self::Host>> + Send {
        std::future::ready(self.hub.share(name))
    }

    fn shared_service(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Option<Self::Guest>> + Send {
        std::future::ready(self.hub.lookup(name))
    }
}

/// Host side of a loopback service. Dropping it unpublishes the service and
/// ends every guest subscription.
#[derive(Debug)]
pub struct LoopbackHostService {
    hub: LoopbackHub,
    name: String,
    tx: broadcast::Sender<Notification>,
}

impl HostService for LoopbackHostService {
    fn notify(&self, event: &str, payload: serde_json::Value) {
        let notification = Notification {
            event: event.to_string(),
            payload,
        };
        self.hub.record(&self.name, notification.clone());
        // No receivers just means no guest is attached yet.
        let delivered = self.tx.send(notification).unwrap_or(0);
        trace!(service = %self.name, event, delivered, "Sent notification");
    }
}

impl Drop for LoopbackHostService {
    fn drop(&mut self) {
        self.hub.unshare(&self.name, &self.tx);
    }
}

/// Guest side of a loopback service.
#[derive(Debug)]
pub struct LoopbackGuestService {
    rx: broadcast::Receiver<Notification>,
}

impl GuestService for LoopbackGuestService {
    fn on_notify(&self, event: &str) -> mpsc::UnboundedReceiver<serde_json::Value> {
        let (tx, out) = mpsc::unbounded_channel();
        let mut rx = self.rx.resubscribe();
        let event = event.to_string();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(notification) if notification.event == event => {
                        if tx.send(notification.payload).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, event = %event, "Guest fell behind on notifications");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        out
    }
}
