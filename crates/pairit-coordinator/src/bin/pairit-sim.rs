//! Pairit role rotation simulator
//!
//! Runs a host and a handful of guests on an in-process loopback session,
//! lets peers join and leave, and logs every role change.
//!
//! Environment:
//!   PAIRIT_SIM_GUESTS     Number of guests (default: 3)
//!   PAIRIT_SIM_TICK_MS    Rotation interval in milliseconds (default: 500)
//!   PAIRIT_SIM_ROUNDS     Rotations to run before the first guest leaves (default: 4)
//!   PAIRIT_SERVICE_NAME   Shared service name (default: pairit)
//!   RUST_LOG              Log filter (default: pairit=info)

use std::time::Duration;

use pairit_coordinator::loopback::LoopbackHub;
use pairit_coordinator::{
    Error, ParticipantId, PeersChange, RoleRotationCoordinator, RotationConfig, SessionEvent,
    SessionRole, TracingDisplay,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulation parameters.
#[derive(Debug, Clone)]
struct SimConfig {
    guests: u32,
    tick: Duration,
    rounds: u32,
}

impl SimConfig {
    fn from_env() -> Result<Self, Error> {
        Ok(Self {
            guests: env_or("PAIRIT_SIM_GUESTS", 3)?,
            tick: Duration::from_millis(env_or("PAIRIT_SIM_TICK_MS", 500)?),
            rounds: env_or("PAIRIT_SIM_ROUNDS", 4)?,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, Error> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// A running participant: its event feed and the coordinator task.
struct Participant {
    id: ParticipantId,
    events: mpsc::Sender<SessionEvent>,
    task: JoinHandle<()>,
}

async fn spawn_participant(
    hub: &LoopbackHub,
    id: ParticipantId,
    config: RotationConfig,
) -> Result<Participant, Error> {
    let coordinator = RoleRotationCoordinator::connect(
        std::future::ready(Some(hub.peer(id))),
        TracingDisplay::new(id),
        config,
    )
    .await?;

    let (events, rx) = mpsc::channel(16);
    let task = tokio::spawn(coordinator.run(rx));
    Ok(Participant { id, events, task })
}

async fn send(participant: &Participant, event: SessionEvent) {
    if participant.events.send(event).await.is_err() {
        tracing::warn!(participant = %participant.id, "Coordinator already stopped");
    }
}

/// Let in-flight events settle before the next scripted step.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pairit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let sim = SimConfig::from_env()?;
    let config = RotationConfig::from_env()?.with_interval(sim.tick);

    tracing::info!(
        guests = sim.guests,
        tick = ?sim.tick,
        rounds = sim.rounds,
        "Starting role rotation simulation"
    );

    let hub = LoopbackHub::new();

    let host = spawn_participant(&hub, ParticipantId::HOST, config.clone()).await?;
    send(&host, SessionEvent::RoleChanged(SessionRole::Host)).await;
    settle().await;

    let mut guests = Vec::with_capacity(sim.guests as usize);
    for n in 1..=sim.guests {
        let guest = spawn_participant(&hub, ParticipantId(n), config.clone()).await?;
        send(&guest, SessionEvent::RoleChanged(SessionRole::Guest)).await;
        settle().await;
        send(
            &host,
            SessionEvent::PeersChanged(PeersChange::joined([guest.id])),
        )
        .await;
        guests.push(guest);
    }

    tokio::time::sleep(sim.tick * sim.rounds).await;

    if !guests.is_empty() {
        let leaving = guests.remove(0);
        tracing::info!(participant = %leaving.id, "Guest leaving session");
        send(&leaving, SessionEvent::RoleChanged(SessionRole::None)).await;
        send(
            &host,
            SessionEvent::PeersChanged(PeersChange::left([leaving.id])),
        )
        .await;
        drop(leaving.events);
        leaving.task.await?;

        tokio::time::sleep(sim.tick * sim.rounds).await;
    }

    send(&host, SessionEvent::RoleChanged(SessionRole::None)).await;
    for participant in std::iter::once(host).chain(guests) {
        drop(participant.events);
        participant.task.await?;
    }

    let sent = hub.sent_count(&config.service_name);
    println!();
    println!("Simulation complete:");
    println!("  Role updates broadcast: {}", sent);

    Ok(())
}
