//! Role Rotation Coordinator - one authoritative role assignment per session.
//!
//! The host owns the [`ParticipantOrder`] and is its only writer. On every
//! tick it rotates the order by one, broadcasts the resulting assignment over
//! the shared `updateRoles` service and applies its own entry. Peer joins and
//! leaves are folded into the order and re-broadcast immediately, without
//! rotating. Guests only listen and apply the entry keyed by their identity.
//!
//! # Event handling
//!
//! All reactions are plain methods ([`on_session_role_changed`],
//! [`on_peers_changed`], [`tick`], [`on_roles_update`]) so they can be driven
//! directly. [`run`] multiplexes session events, the rotation timer and the
//! guest subscription on one task, so handlers never overlap.
//!
//! Each broadcast is a full snapshot. Guests keep whichever arrived last.
//!
//! [`on_session_role_changed`]: RoleRotationCoordinator::on_session_role_changed
//! [`on_peers_changed`]: RoleRotationCoordinator::on_peers_changed
//! [`tick`]: RoleRotationCoordinator::tick
//! [`on_roles_update`]: RoleRotationCoordinator::on_roles_update
//! [`run`]: RoleRotationCoordinator::run

use std::future::Future;

use pairit_roles::{
    ParticipantId, ParticipantOrder, Role, RoleAssignment, RolesUpdate, UPDATE_ROLES_EVENT,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::RotationConfig;
use crate::display::{LocalRole, RoleDisplay};
use crate::error::{Error, Result};
use crate::session::{GuestService, HostService, PeersChange, SessionApi, SessionEvent, SessionRole};
use crate::timer::RotationTimer;

/// Per-role state. Only one role is ever active.
enum Mode<H, G> {
    Inactive,
    Host {
        service: H,
        order: ParticipantOrder,
    },
    /// Guest whose service lookup failed and will be retried at `retry_at`.
    Joining {
        attempt: u32,
        retry_at: Instant,
    },
    Guest {
        updates: mpsc::UnboundedReceiver<serde_json::Value>,
        // Held so the subscription outlives the lookup.
        _service: G,
    },
}

/// What the active role wants handled next in the event loop.
enum Step {
    Update(Option<serde_json::Value>),
    Retry,
}

/// Assigns and synchronizes Driver / Navigator / Mob roles for one session API.
pub struct RoleRotationCoordinator<S: SessionApi, D: RoleDisplay> {
    session: S,
    config: RotationConfig,
    local: LocalRole<D>,
    timer: RotationTimer,
    mode: Mode<S::Host, S::Guest>,
}

impl<S: SessionApi, D: RoleDisplay> RoleRotationCoordinator<S, D> {
    /// Create an inactive coordinator around an acquired session API.
    ///
    /// The status indicator starts out blank. Fails with
    /// [`Error::InvalidConfig`] if `config` does not validate.
    pub fn new(session: S, display: D, config: RotationConfig) -> Result<Self> {
        config.validate()?;
        let timer = RotationTimer::new(config.interval);
        Ok(Self {
            session,
            config,
            local: LocalRole::new(display),
            timer,
            mode: Mode::Inactive,
        })
    }

    /// Acquire the session API and create a coordinator around it.
    ///
    /// Fails with [`Error::SessionUnavailable`] if the API cannot be obtained,
    /// in which case role rotation stays off for this process.
    pub async fn connect<F>(acquire: F, display: D, config: RotationConfig) -> Result<Self>
    where
        F: Future<Output = Option<S>>,
    {
        config.validate()?;
        let Some(session) = acquire.await else {
            error!("Error getting session API, role rotation disabled");
            return Err(Error::SessionUnavailable);
        };
        info!(participant = %session.local_identity(), "Session API acquired");
        Self::new(session, display, config)
    }

    /// Identity of the local participant.
    #[must_use]
    pub fn local_identity(&self) -> ParticipantId {
        self.session.local_identity()
    }

    /// Role this coordinator is currently acting in.
    #[must_use]
    pub fn session_role(&self) -> SessionRole {
        match self.mode {
            Mode::Inactive => SessionRole::None,
            Mode::Host { .. } => SessionRole::Host,
            Mode::Joining { .. } | Mode::Guest { .. } => SessionRole::Guest,
        }
    }

    /// Check whether a guest is still waiting to retry the service lookup.
    #[must_use]
    pub fn is_joining(&self) -> bool {
        matches!(self.mode, Mode::Joining { .. })
    }

    /// The authoritative order, if hosting.
    #[must_use]
    pub fn order(&self) -> Option<&ParticipantOrder> {
        match &self.mode {
            Mode::Host { order, .. } => Some(order),
            _ => None,
        }
    }

    /// Assignment derived from the current order, if hosting.
    #[must_use]
    pub fn assignment(&self) -> Option<RoleAssignment> {
        self.order().map(ParticipantOrder::assignment)
    }

    /// Role last applied locally.
    #[must_use]
    pub fn local_role(&self) -> Option<Role> {
        self.local.current()
    }

    /// The display role changes are surfaced on.
    #[must_use]
    pub fn display(&self) -> &D {
        self.local.display()
    }

    /// Check whether the rotation timer is armed.
    #[must_use]
    pub fn is_rotating(&self) -> bool {
        self.timer.is_running()
    }

    /// React to the local process becoming host, guest, or leaving the session.
    ///
    /// State of the previous role is always torn down first.
    pub async fn on_session_role_changed(&mut self, role: SessionRole) -> Result<()> {
        info!(%role, participant = %self.local_identity(), "Session role changed");
        self.stop();
        match role {
            SessionRole::None => Ok(()),
            SessionRole::Host => self.start_host().await,
            SessionRole::Guest => self.start_guest().await,
        }
    }

    /// Cancel the rotation timer and drop all session state.
    pub fn stop(&mut self) {
        self.timer.stop();
        if !matches!(self.mode, Mode::Inactive) {
            debug!(role = %self.session_role(), "Leaving session role");
        }
        self.mode = Mode::Inactive;
        self.local.clear();
    }

    async fn start_host(&mut self) -> Result<()> {
        let name = self.config.service_name.as_str();
        let Some(service) = self.session.share_service(name).await else {
            error!(service = name, "Could not share service, role rotation disabled");
            return Err(Error::ServiceUnavailable {
                service: name.to_string(),
                role: SessionRole::Host,
            });
        };

        let local = self.session.local_identity();
        self.mode = Mode::Host {
            service,
            order: ParticipantOrder::new(local),
        };
        info!(
            participant = %local,
            interval = ?self.timer.period(),
            "Hosting role rotation"
        );

        self.tick();
        self.timer.start();
        Ok(())
    }

    async fn start_guest(&mut self) -> Result<()> {
        self.lookup_service(1).await
    }

    /// Retry a failed guest lookup ahead of its scheduled time.
    ///
    /// No-op unless the coordinator is waiting to retry.
    pub async fn retry_lookup(&mut self) -> Result<()> {
        match self.mode {
            Mode::Joining { attempt, .. } => self.lookup_service(attempt + 1).await,
            _ => Ok(()),
        }
    }

    /// One lookup attempt. A miss with attempts left schedules the next one
    /// instead of sleeping, so role changes are never held up by a retry.
    async fn lookup_service(&mut self, attempt: u32) -> Result<()> {
        let name = self.config.service_name.as_str();
        let attempts = self.config.service_lookup_attempts.max(1);

        let Some(service) = self.session.shared_service(name).await else {
            if attempt >= attempts {
                error!(service = name, attempts, "Shared service not found, no role for this session");
                let service = name.to_string();
                self.mode = Mode::Inactive;
                return Err(Error::ServiceUnavailable {
                    service,
                    role: SessionRole::Guest,
                });
            }
            debug!(service = name, attempt, "Shared service not found yet, retrying");
            self.mode = Mode::Joining {
                attempt,
                retry_at: Instant::now() + self.config.service_retry_delay,
            };
            return Ok(());
        };

        let updates = service.on_notify(UPDATE_ROLES_EVENT);
        self.mode = Mode::Guest {
            updates,
            _service: service,
        };
        info!(participant = %self.local_identity(), attempt, "Listening for role updates");
        Ok(())
    }

    /// Rotate the order by one and broadcast the new assignment. Host only.
    pub fn tick(&mut self) {
        let Mode::Host { order, .. } = &mut self.mode else {
            debug!("Ignoring rotation tick outside host role");
            return;
        };
        order.rotate();
        debug!(
            driver = ?order.driver(),
            navigator = ?order.navigator(),
            participants = order.len(),
            "Rotated roles"
        );
        self.broadcast();
    }

    /// Fold joins and leaves into the order, then re-broadcast without
    /// rotating. Host only.
    ///
    /// Joiners go to the back; leavers are removed wherever they sit.
    pub fn on_peers_changed(&mut self, change: &PeersChange) {
        let Mode::Host { order, .. } = &mut self.mode else {
            debug!(?change, "Ignoring peer change outside host role");
            return;
        };

        for &peer in &change.added {
            if order.add(peer) {
                info!(participant = %peer, "Participant joined rotation");
            }
        }
        for &peer in &change.removed {
            if order.remove(peer) {
                info!(participant = %peer, "Participant left rotation");
            }
        }

        self.broadcast();
    }

    /// Apply an `updateRoles` payload received from the host. Guest only.
    ///
    /// Snapshots without an entry for the local participant leave the current
    /// role untouched.
    pub fn on_roles_update(&mut self, payload: serde_json::Value) -> Result<()> {
        if !matches!(self.mode, Mode::Guest { .. }) {
            debug!("Ignoring roles update outside guest role");
            return Ok(());
        }

        let update = RolesUpdate::from_value(payload)?;
        let me = self.local_identity();
        match update.roles.role_of(me) {
            Some(role) => {
                self.local.apply(role);
            }
            None => debug!(participant = %me, "Roles update has no entry for local participant"),
        }
        Ok(())
    }

    /// Dispatch one session event, logging failures.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::RoleChanged(role) => {
                if let Err(e) = self.on_session_role_changed(role).await {
                    error!(error = %e, "Role rotation unavailable for this session");
                }
            }
            SessionEvent::PeersChanged(change) => self.on_peers_changed(&change),
        }
    }

    /// Drive the coordinator until the session event stream closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                () = self.timer.wait() => self.tick(),
                step = next_step(&mut self.mode) => match step {
                    Step::Update(Some(payload)) => {
                        if let Err(e) = self.on_roles_update(payload) {
                            warn!(error = %e, "Ignoring malformed roles update");
                        }
                    }
                    Step::Update(None) => {
                        warn!("Roles subscription closed by host");
                        self.stop();
                    }
                    Step::Retry => {
                        if let Err(e) = self.retry_lookup().await {
                            error!(error = %e, "Role rotation unavailable for this session");
                        }
                    }
                },
            }
        }

        self.stop();
        info!(participant = %self.local_identity(), "Role rotation stopped");
    }

    fn broadcast(&mut self) {
        let Mode::Host { service, order } = &self.mode else {
            return;
        };

        let update = RolesUpdate::from_order(order);
        match update.to_value() {
            Ok(payload) => service.notify(UPDATE_ROLES_EVENT, payload),
            Err(e) => warn!(error = %e, "Could not encode roles update"),
        }

        let me = self.session.local_identity();
        if let Some(role) = update.roles.role_of(me) {
            self.local.apply(role);
        }
    }
}

/// Next guest payload or due lookup retry. Pends forever in other roles.
async fn next_step<H, G>(mode: &mut Mode<H, G>) -> Step {
    match mode {
        Mode::Guest { updates, .. } => Step::Update(updates.recv().await),
        Mode::Joining { retry_at, .. } => {
            tokio::time::sleep_until(*retry_at).await;
            Step::Retry
        }
        _ => std::future::pending().await,
    }
}
