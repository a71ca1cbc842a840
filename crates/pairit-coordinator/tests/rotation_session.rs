//! End-to-end rotation over the loopback session.
//!
//! Host and guests run as separate tasks driven only by session events, the
//! way a real session layer would drive them. Time is paused so the
//! four-minute cadence runs instantly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pairit_coordinator::loopback::LoopbackHub;
use pairit_coordinator::{
    ParticipantId, PeersChange, Role, RoleDisplay, RoleRotationCoordinator, RolesUpdate,
    RotationConfig, SessionEvent, SessionRole,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const INTERVAL: Duration = Duration::from_secs(240);

/// Display whose announcements stay observable after the coordinator moves
/// into its task.
#[derive(Debug, Clone, Default)]
struct SharedDisplay {
    announcements: Arc<Mutex<Vec<Role>>>,
}

impl SharedDisplay {
    fn announced(&self) -> Vec<Role> {
        self.announcements.lock().unwrap().clone()
    }

    fn current(&self) -> Option<Role> {
        self.announced().last().copied()
    }
}

impl RoleDisplay for SharedDisplay {
    fn show_status(&mut self, _text: &str) {}

    fn announce(&mut self, role: Role) {
        self.announcements.lock().unwrap().push(role);
    }
}

struct Member {
    id: ParticipantId,
    display: SharedDisplay,
    events: mpsc::Sender<SessionEvent>,
    task: JoinHandle<()>,
}

impl Member {
    fn spawn(hub: &LoopbackHub, id: u32) -> Self {
        Self::spawn_with(hub, id, RotationConfig::default().with_interval(INTERVAL))
    }

    fn spawn_with(hub: &LoopbackHub, id: u32, config: RotationConfig) -> Self {
        let id = ParticipantId(id);
        let display = SharedDisplay::default();
        let coordinator =
            RoleRotationCoordinator::new(hub.peer(id), display.clone(), config).unwrap();
        let (events, rx) = mpsc::channel(16);
        let task = tokio::spawn(coordinator.run(rx));
        Self {
            id,
            display,
            events,
            task,
        }
    }

    async fn send(&self, event: SessionEvent) {
        self.events.send(event).await.unwrap();
        settle().await;
    }

    async fn shutdown(self) {
        drop(self.events);
        self.task.await.unwrap();
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn last_update(hub: &LoopbackHub) -> RolesUpdate {
    let notification = hub.history("pairit").pop().unwrap();
    assert_eq!(notification.event, "updateRoles");
    RolesUpdate::from_value(notification.payload).unwrap()
}

/// Host plus guests 3 and 9, joined in that order: order [0, 3, 9].
async fn session_of_three(hub: &LoopbackHub) -> (Member, Member, Member) {
    let host = Member::spawn(hub, 0);
    host.send(SessionEvent::RoleChanged(SessionRole::Host)).await;

    let a = Member::spawn(hub, 3);
    a.send(SessionEvent::RoleChanged(SessionRole::Guest)).await;
    let b = Member::spawn(hub, 9);
    b.send(SessionEvent::RoleChanged(SessionRole::Guest)).await;

    host.send(SessionEvent::PeersChanged(PeersChange::joined([a.id, b.id])))
        .await;
    (host, a, b)
}

#[tokio::test(start_paused = true)]
async fn joiners_receive_roles_without_waiting_for_a_tick() {
    let hub = LoopbackHub::new();
    let (host, a, b) = session_of_three(&hub).await;

    assert_eq!(host.display.current(), Some(Role::Driver));
    assert_eq!(a.display.current(), Some(Role::Navigator));
    assert_eq!(b.display.current(), Some(Role::Mob));

    for member in [host, a, b] {
        member.shutdown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn roles_rotate_on_each_interval() {
    let hub = LoopbackHub::new();
    let (host, a, b) = session_of_three(&hub).await;

    tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;

    let update = last_update(&hub);
    assert_eq!(update.roles.role_of(a.id), Some(Role::Driver));
    assert_eq!(update.roles.role_of(b.id), Some(Role::Navigator));
    assert_eq!(update.roles.role_of(host.id), Some(Role::Mob));
    assert_eq!(a.display.current(), Some(Role::Driver));
    assert_eq!(b.display.current(), Some(Role::Navigator));
    assert_eq!(host.display.current(), Some(Role::Mob));

    // Two more ticks close the cycle.
    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(host.display.current(), Some(Role::Driver));
    assert_eq!(
        host.display.announced(),
        vec![Role::Driver, Role::Mob, Role::Navigator, Role::Driver]
    );

    for member in [host, a, b] {
        member.shutdown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn departed_peer_is_dropped_from_next_broadcast() {
    let hub = LoopbackHub::new();
    let (host, a, b) = session_of_three(&hub).await;

    a.send(SessionEvent::RoleChanged(SessionRole::None)).await;
    host.send(SessionEvent::PeersChanged(PeersChange::left([a.id])))
        .await;

    let update = last_update(&hub);
    assert_eq!(update.roles.len(), 2);
    assert_eq!(update.roles.role_of(a.id), None);
    assert_eq!(update.roles.role_of(b.id), Some(Role::Navigator));
    assert_eq!(b.display.announced(), vec![Role::Mob, Role::Navigator]);

    for member in [host, a, b] {
        member.shutdown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn repeated_assignment_is_announced_once() {
    let hub = LoopbackHub::new();
    let (host, a, b) = session_of_three(&hub).await;

    // Joining at the back leaves everyone else's position unchanged.
    let c = Member::spawn(&hub, 5);
    c.send(SessionEvent::RoleChanged(SessionRole::Guest)).await;
    host.send(SessionEvent::PeersChanged(PeersChange::joined([c.id])))
        .await;

    assert_eq!(a.display.announced(), vec![Role::Navigator]);
    assert_eq!(b.display.announced(), vec![Role::Mob]);
    assert_eq!(c.display.announced(), vec![Role::Mob]);

    for member in [host, a, b, c] {
        member.shutdown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn ending_host_session_stops_broadcasts() {
    let hub = LoopbackHub::new();
    let (host, a, b) = session_of_three(&hub).await;

    host.send(SessionEvent::RoleChanged(SessionRole::None)).await;
    let sent = hub.sent_count("pairit");
    assert!(!hub.is_shared("pairit"));

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(hub.sent_count("pairit"), sent);

    for member in [host, a, b] {
        member.shutdown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn guest_without_host_stays_roleless() {
    let hub = LoopbackHub::new();
    let guest = Member::spawn(&hub, 4);

    guest
        .send(SessionEvent::RoleChanged(SessionRole::Guest))
        .await;
    tokio::time::sleep(INTERVAL).await;

    assert!(guest.display.announced().is_empty());
    guest.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn leaving_during_lookup_retry_takes_effect_at_once() {
    let hub = LoopbackHub::new();
    let guest = Member::spawn_with(
        &hub,
        4,
        RotationConfig::default().with_service_retry(5, Duration::from_secs(60)),
    );
    let started = tokio::time::Instant::now();

    guest
        .send(SessionEvent::RoleChanged(SessionRole::Guest))
        .await;
    guest.send(SessionEvent::RoleChanged(SessionRole::None)).await;
    guest.shutdown().await;

    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn guest_retry_picks_up_late_host() {
    let hub = LoopbackHub::new();
    let guest = Member::spawn_with(
        &hub,
        4,
        RotationConfig::default()
            .with_interval(INTERVAL)
            .with_service_retry(3, Duration::from_secs(2)),
    );
    guest
        .send(SessionEvent::RoleChanged(SessionRole::Guest))
        .await;

    let host = Member::spawn(&hub, 0);
    host.send(SessionEvent::RoleChanged(SessionRole::Host)).await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    host.send(SessionEvent::PeersChanged(PeersChange::joined([guest.id])))
        .await;
    assert_eq!(guest.display.announced(), vec![Role::Navigator]);

    for member in [host, guest] {
        member.shutdown().await;
    }
}
