//! Cancellable periodic timer for rotation ticks.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Owned periodic timer. Stopping it drops the underlying interval, so a
/// stopped timer never fires again until restarted.
#[derive(Debug)]
pub struct RotationTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl RotationTimer {
    /// Create a stopped timer with the given period.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// The configured period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Check whether the timer is armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Arm the timer. The first firing is one full period from now.
    ///
    /// Restarting a running timer resets its phase.
    pub fn start(&mut self) {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    /// Cancel any pending firing.
    pub fn stop(&mut self) {
        self.interval = None;
    }

    /// Wait for the next firing. Pends forever while stopped.
    pub async fn wait(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
