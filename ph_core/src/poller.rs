//! Periodic update loop for a `PhSensor`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ph_traits::Clock;

use crate::sensor::{PhSensor, Reading};

/// Upper bound on a single sleep so a shutdown request is noticed promptly.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Updates attempted.
    pub updates: u64,
    /// Updates that returned an error.
    pub failures: u64,
}

pub struct Poller<C: Clock> {
    clock: C,
    interval: Duration,
    max_updates: Option<u64>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<C: Clock> Poller<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            interval,
            max_updates: None,
            shutdown: None,
        }
    }

    /// Stop after `n` updates.
    pub fn with_max_updates(mut self, n: u64) -> Self {
        self.max_updates = Some(n);
        self
    }

    /// Stop once `flag` becomes true.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    fn stopping(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    /// Run updates on a fixed schedule until the count or shutdown flag stops it.
    ///
    /// A failed update is logged and counted; polling continues.
    pub fn run<F>(&self, sensor: &mut PhSensor, mut on_reading: F) -> PollSummary
    where
        F: FnMut(&Reading),
    {
        let mut summary = PollSummary::default();
        let mut next = self.clock.now();
        loop {
            if self.stopping() {
                tracing::debug!("poller received shutdown signal");
                break;
            }
            if self.max_updates.is_some_and(|m| summary.updates >= m) {
                break;
            }

            match sensor.update() {
                Ok(r) => on_reading(&r),
                Err(e) => {
                    summary.failures += 1;
                    tracing::warn!(error = %e, "ph update failed");
                }
            }
            summary.updates += 1;

            if self.max_updates.is_some_and(|m| summary.updates >= m) {
                break;
            }
            next += self.interval;
            // sleep in slices so shutdown is not delayed by a long interval
            while self.clock.now() < next && !self.stopping() {
                let remaining = next.saturating_duration_since(self.clock.now());
                self.clock.sleep(remaining.min(SHUTDOWN_POLL));
            }
        }
        tracing::trace!(
            updates = summary.updates,
            failures = summary.failures,
            "poller exiting"
        );
        summary
    }
}
