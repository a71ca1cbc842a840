//! Coordinator configuration.

use std::time::Duration;

use pairit_roles::DEFAULT_SERVICE_NAME;

use crate::error::{Error, Result};

/// Default time between rotation ticks.
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_secs(4 * 60);

/// Configuration for a [`RoleRotationCoordinator`](crate::RoleRotationCoordinator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Time between rotation ticks on the host.
    pub interval: Duration,

    /// Name under which the host shares the notification service.
    pub service_name: String,

    /// How many times a guest looks up the shared service before giving up.
    /// One attempt means no retry.
    pub service_lookup_attempts: u32,

    /// Pause between guest lookup attempts.
    pub service_retry_delay: Duration,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_ROTATION_INTERVAL,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            service_lookup_attempts: 1,
            service_retry_delay: Duration::from_secs(2),
        }
    }
}

impl RotationConfig {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// Reads `PAIRIT_ROTATION_SECS`, `PAIRIT_SERVICE_NAME`,
    /// `PAIRIT_LOOKUP_ATTEMPTS` and `PAIRIT_LOOKUP_RETRY_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "PAIRIT_ROTATION_SECS")? {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(name) = lookup("PAIRIT_SERVICE_NAME") {
            config.service_name = name;
        }
        if let Some(attempts) = parse_var(&lookup, "PAIRIT_LOOKUP_ATTEMPTS")? {
            config.service_lookup_attempts = attempts;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "PAIRIT_LOOKUP_RETRY_MS")? {
            config.service_retry_delay = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the rotation interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the shared service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Let guests retry the service lookup.
    #[must_use]
    pub fn with_service_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.service_lookup_attempts = attempts;
        self.service_retry_delay = delay;
        self
    }

    /// Reject values the coordinator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidConfig {
                key: "interval",
                value: format!("{:?}", self.interval),
            });
        }
        if self.service_lookup_attempts == 0 {
            return Err(Error::InvalidConfig {
                key: "service_lookup_attempts",
                value: "0".to_string(),
            });
        }
        if self.service_name.is_empty() {
            return Err(Error::InvalidConfig {
                key: "service_name",
                value: String::new(),
            });
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig { key, value: raw }),
    }
}
