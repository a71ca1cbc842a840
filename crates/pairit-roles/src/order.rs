//! Ordered participant list driving role rotation.
//!
//! The position of a participant in the order *is* its role: the front is the
//! Driver, the next one the Navigator, everyone else is Mob. Rotating the order
//! left by one each tick walks every participant through
//! Driver → Navigator → Mob → … → Driver over N ticks, so no separate
//! "whose turn is next" state is needed.

use std::collections::VecDeque;

use crate::assignment::RoleAssignment;
use crate::role::{ParticipantId, Role};

/// Join-ordered list of session participants without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantOrder {
    participants: VecDeque<ParticipantId>,
}

impl ParticipantOrder {
    /// Create an order holding only the local participant.
    #[must_use]
    pub fn new(local: ParticipantId) -> Self {
        let mut participants = VecDeque::new();
        participants.push_back(local);
        Self { participants }
    }

    /// Number of participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Check whether the order is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Check whether `id` is part of the order.
    #[must_use]
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains(&id)
    }

    /// Iterate participants from the front (Driver) to the back.
    pub fn iter(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().copied()
    }

    /// Current Driver, if anyone is present.
    #[must_use]
    pub fn driver(&self) -> Option<ParticipantId> {
        self.participants.front().copied()
    }

    /// Current Navigator, if at least two participants are present.
    #[must_use]
    pub fn navigator(&self) -> Option<ParticipantId> {
        self.participants.get(1).copied()
    }

    /// Append a newly joined participant at the back (lowest priority).
    ///
    /// Returns `false` and leaves the order untouched if `id` is already present.
    pub fn add(&mut self, id: ParticipantId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.participants.push_back(id);
        true
    }

    /// Remove a departed participant wherever it sits.
    ///
    /// Returns `false` if `id` was not present.
    pub fn remove(&mut self, id: ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| *p != id);
        self.participants.len() != before
    }

    /// Move the front participant to the back.
    pub fn rotate(&mut self) {
        if !self.participants.is_empty() {
            self.participants.rotate_left(1);
        }
    }

    /// Role currently held by `id`.
    #[must_use]
    pub fn role_of(&self, id: ParticipantId) -> Option<Role> {
        self.participants
            .iter()
            .position(|p| *p == id)
            .map(Role::for_position)
    }

    /// Derive the role of every participant from its position.
    #[must_use]
    pub fn assignment(&self) -> RoleAssignment {
        self.participants
            .iter()
            .enumerate()
            .map(|(position, id)| (*id, Role::for_position(position)))
            .collect()
    }
}

impl FromIterator<ParticipantId> for ParticipantOrder {
    /// Build an order from join events, skipping repeated identities.
    fn from_iter<I: IntoIterator<Item = ParticipantId>>(iter: I) -> Self {
        let mut order = Self::default();
        for id in iter {
            order.add(id);
        }
        order
    }
}
