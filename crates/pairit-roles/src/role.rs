//! Participant identities and collaboration roles.

use serde::{Deserialize, Serialize};

/// Numeric identity of a session member, assigned by the session layer.
///
/// The host is conventionally identity 0. Identities are never generated
/// here; they arrive with role-change and peer-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// The identity the session layer gives the host.
    pub const HOST: ParticipantId = ParticipantId(0);

    /// Get the raw numeric identity.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ParticipantId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Collaboration role held by one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Active editor.
    Driver,
    /// Active reviewer.
    Navigator,
    /// Observer.
    Mob,
}

impl Role {
    /// Role held by whoever sits at `position` in the participant order.
    #[must_use]
    pub const fn for_position(position: usize) -> Self {
        match position {
            0 => Role::Driver,
            1 => Role::Navigator,
            _ => Role::Mob,
        }
    }

    /// Name used on the wire and in the status indicator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Driver => "Driver",
            Role::Navigator => "Navigator",
            Role::Mob => "Mob",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_map_to_roles() {
        assert_eq!(Role::for_position(0), Role::Driver);
        assert_eq!(Role::for_position(1), Role::Navigator);
        assert_eq!(Role::for_position(2), Role::Mob);
        assert_eq!(Role::for_position(17), Role::Mob);
    }

    #[test]
    fn role_names_match_wire_format() {
        for role in [Role::Driver, Role::Navigator, Role::Mob] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(role.to_string(), role.as_str());
        }
    }

    #[test]
    fn participant_id_is_transparent() {
        assert_eq!(serde_json::to_string(&ParticipantId(7)).unwrap(), "7");
        assert_eq!(ParticipantId::HOST.get(), 0);
        assert_eq!(format!("{}", ParticipantId(3)), "#3");
    }
}
