//! Pairit Coordinator - Host-driven role rotation for shared editing sessions
//!
//! Keeps one authoritative Driver / Navigator / Mob assignment per session and
//! pushes it from the host to every guest.
//!
//! # Overview
//!
//! The [`RoleRotationCoordinator`] runs in every participant:
//!
//! - **Host**: owns the participant order, rotates it on a fixed interval
//!   (four minutes by default) and broadcasts each assignment over a shared
//!   `updateRoles` service. Joins and leaves are re-broadcast immediately.
//! - **Guest**: subscribes to the host's service and applies its own entry.
//!
//! The session layer itself is out of scope. It is reached only through the
//! traits in [`session`]; [`loopback`] provides an in-process implementation
//! for tests and the `pairit-sim` binary.
//!
//! # Example
//!
//! ```no_run
//! use pairit_coordinator::loopback::LoopbackHub;
//! use pairit_coordinator::{
//!     RoleRotationCoordinator, RotationConfig, SessionEvent, SessionRole, TracingDisplay,
//! };
//! use pairit_roles::ParticipantId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = LoopbackHub::new();
//!     let host = RoleRotationCoordinator::connect(
//!         std::future::ready(Some(hub.peer(ParticipantId::HOST))),
//!         TracingDisplay::new(ParticipantId::HOST),
//!         RotationConfig::from_env()?,
//!     )
//!     .await?;
//!
//!     let (events, rx) = tokio::sync::mpsc::channel(16);
//!     let task = tokio::spawn(host.run(rx));
//!     events.send(SessionEvent::RoleChanged(SessionRole::Host)).await?;
//!
//!     drop(events);
//!     task.await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod loopback;
pub mod session;
pub mod timer;

pub use config::{RotationConfig, DEFAULT_ROTATION_INTERVAL};
pub use coordinator::RoleRotationCoordinator;
pub use display::{LocalRole, RoleDisplay, TracingDisplay};
pub use error::{Error, Result};
pub use session::{GuestService, HostService, PeersChange, SessionApi, SessionEvent, SessionRole};
pub use timer::RotationTimer;

// Re-export the data model for convenience
pub use pairit_roles::{ParticipantId, ParticipantOrder, Role, RoleAssignment, RolesUpdate};
