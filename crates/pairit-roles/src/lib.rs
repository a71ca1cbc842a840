//! Pairit Roles - Rotating Driver / Navigator / Mob assignment
//!
//! Pure data model for role rotation in a shared editing session. Nothing in
//! this crate performs I/O; the coordinator crate drives it.
//!
//! # Overview
//!
//! - [`ParticipantOrder`]: join-ordered participants; position decides role
//! - [`RoleAssignment`]: snapshot derived from the order, never stored
//! - [`RolesUpdate`]: the `updateRoles` wire payload broadcast by the host
//!
//! # Example
//!
//! ```
//! use pairit_roles::{ParticipantId, ParticipantOrder, Role};
//!
//! let mut order = ParticipantOrder::new(ParticipantId::HOST);
//! order.add(ParticipantId(3));
//! order.add(ParticipantId(9));
//!
//! order.rotate();
//! let roles = order.assignment();
//! assert_eq!(roles.role_of(ParticipantId(3)), Some(Role::Driver));
//! assert_eq!(roles.role_of(ParticipantId::HOST), Some(Role::Mob));
//! ```

pub mod assignment;
pub mod order;
pub mod protocol;
pub mod role;

pub use assignment::RoleAssignment;
pub use order::ParticipantOrder;
pub use protocol::{RolesUpdate, DEFAULT_SERVICE_NAME, UPDATE_ROLES_EVENT};
pub use role::{ParticipantId, Role};
