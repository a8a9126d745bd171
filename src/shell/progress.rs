//! The load-progress poll: a cancellable repeating task.
//!
//! The engine does not push granular progress, so the shell polls it on a
//! fixed interval while a load is in flight. The task must be cancelled when
//! progress reaches 1.0 or it free-runs for the process lifetime; completion
//! is handled where the tick observes the progress value (see
//! [`crate::shell::Shell::step`]).

use std::time::{Duration, Instant};

/// Repeating poll schedule with explicit start and cancel.
///
/// The clock is passed in by the caller, so ticks are deterministic in tests.
#[derive(Debug)]
pub struct ProgressPoller {
    interval: Duration,
    next_due: Option<Instant>,
}

impl ProgressPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Arm the poller; the first tick fires one interval from `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Disarm the poller; the stop signal of the repeating task.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Whether a tick fires at `now`. Firing reschedules the next tick.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
