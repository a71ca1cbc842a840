//! Role assignment snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::role::{ParticipantId, Role};

/// Complete mapping from participant to role at one point in time.
///
/// Always derived from a [`ParticipantOrder`](crate::ParticipantOrder); guests
/// receive it as a full snapshot and simply replace what they had.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleAssignment(BTreeMap<ParticipantId, Role>);

impl RoleAssignment {
    /// Role assigned to `id`, if it is part of the snapshot.
    #[must_use]
    pub fn role_of(&self, id: ParticipantId) -> Option<Role> {
        self.0.get(&id).copied()
    }

    /// Number of participants in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Participant holding `role`. For `Mob` this returns the lowest identity.
    #[must_use]
    pub fn holder_of(&self, role: Role) -> Option<ParticipantId> {
        self.0.iter().find(|(_, r)| **r == role).map(|(id, _)| *id)
    }

    /// Iterate `(participant, role)` pairs in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, Role)> + '_ {
        self.0.iter().map(|(id, role)| (*id, *role))
    }
}

impl FromIterator<(ParticipantId, Role)> for RoleAssignment {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, Role)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
