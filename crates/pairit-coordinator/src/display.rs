//! User-facing role surface and local role cache.

use pairit_roles::{ParticipantId, Role};
use tracing::{debug, info};

/// Where the local participant's role is shown.
pub trait RoleDisplay: Send + 'static {
    /// Update the persistent status indicator.
    fn show_status(&mut self, text: &str);

    /// Show a transient notification for a newly taken role.
    fn announce(&mut self, role: Role);
}

/// Display that writes role changes to the log.
#[derive(Debug, Clone)]
pub struct TracingDisplay {
    participant: ParticipantId,
}

impl TracingDisplay {
    /// Display for `participant`'s role changes.
    #[must_use]
    pub fn new(participant: ParticipantId) -> Self {
        Self { participant }
    }
}

impl RoleDisplay for TracingDisplay {
    fn show_status(&mut self, text: &str) {
        debug!(participant = %self.participant, status = text, "Status updated");
    }

    fn announce(&mut self, role: Role) {
        info!(participant = %self.participant, %role, "New Role: {}", role);
    }
}

/// Cached "my current role", used only to suppress repeat notifications.
#[derive(Debug)]
pub struct LocalRole<D> {
    current: Option<Role>,
    display: D,
}

impl<D: RoleDisplay> LocalRole<D> {
    /// Wrap a display and blank its status indicator.
    pub fn new(mut display: D) -> Self {
        display.show_status("");
        Self {
            current: None,
            display,
        }
    }

    /// Role last applied, if any.
    #[must_use]
    pub fn current(&self) -> Option<Role> {
        self.current
    }

    /// The wrapped display.
    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Apply `role`. Returns `true` if it differed from the cached one and
    /// was surfaced to the user.
    pub fn apply(&mut self, role: Role) -> bool {
        if self.current == Some(role) {
            return false;
        }
        self.current = Some(role);
        self.display.announce(role);
        self.display.show_status(role.as_str());
        true
    }

    /// Forget the cached role and blank the status indicator.
    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            self.display.show_status("");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Display that records everything it is asked to show.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingDisplay {
        pub announcements: Vec<Role>,
        pub status: String,
    }

    impl RoleDisplay for RecordingDisplay {
        fn show_status(&mut self, text: &str) {
            self.status = text.to_string();
        }

        fn announce(&mut self, role: Role) {
            self.announcements.push(role);
        }
    }

    #[test]
    fn same_role_is_announced_once() {
        let mut local = LocalRole::new(RecordingDisplay::default());

        assert!(local.apply(Role::Navigator));
        assert!(!local.apply(Role::Navigator));

        assert_eq!(local.display().announcements, vec![Role::Navigator]);
        assert_eq!(local.display().status, "Navigator");
    }

    #[test]
    fn role_change_updates_status() {
        let mut local = LocalRole::new(RecordingDisplay::default());
        local.apply(Role::Mob);
        local.apply(Role::Driver);

        assert_eq!(local.current(), Some(Role::Driver));
        assert_eq!(local.display().announcements, vec![Role::Mob, Role::Driver]);
        assert_eq!(local.display().status, "Driver");
    }

    #[test]
    fn clear_blanks_status_and_rearms() {
        let mut local = LocalRole::new(RecordingDisplay::default());
        local.apply(Role::Driver);
        local.clear();

        assert_eq!(local.current(), None);
        assert_eq!(local.display().status, "");

        assert!(local.apply(Role::Driver));
        assert_eq!(local.display().announcements.len(), 2);
    }
}
