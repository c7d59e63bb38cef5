//! Inactivity watchdog.
//!
//! The watchdog owns at most one pending timer. The timer primitive itself is
//! injected through [`TimerService`]; when a timer elapses the runtime calls
//! back into the controller with the [`ArmId`] it was started with, and
//! [`TimeoutWatchdog::fire`] decides whether that arm is still current.

use log::*;
use std::time::Duration;

/// Identifies one arming of the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArmId(u64);

impl ArmId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A started timer. Cancelling must be idempotent.
pub trait TimerGuard: Send {
    fn cancel(&mut self);
}

/// Starts timers that report back with their [`ArmId`] once `after` elapsed.
pub trait TimerService: Send {
    fn start(&mut self, after: Duration, arm: ArmId) -> Box<dyn TimerGuard>;
}

struct Pending {
    arm: ArmId,
    guard: Box<dyn TimerGuard>,
}

pub struct TimeoutWatchdog {
    timers: Box<dyn TimerService>,
    pending: Option<Pending>,
    next_arm: u64,
}

impl TimeoutWatchdog {
    pub fn new(timers: Box<dyn TimerService>) -> Self {
        Self {
            timers,
            pending: None,
            next_arm: 0,
        }
    }

    /// Cancels any pending timer, then starts a new one.
    pub fn arm(&mut self, after: Duration) -> ArmId {
        self.disarm();
        self.next_arm += 1;
        let arm = ArmId(self.next_arm);
        let guard = self.timers.start(after, arm);
        trace!("Watchdog armed ({}) for {:?}", arm.as_u64(), after);
        self.pending = Some(Pending { arm, guard });
        arm
    }

    pub fn disarm(&mut self) {
        if let Some(mut pending) = self.pending.take() {
            trace!("Watchdog disarmed ({})", pending.arm.as_u64());
            pending.guard.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the pending timer if `arm` is the current one.
    ///
    /// Returns false for cancelled or superseded arms, so each arm fires at
    /// most once.
    pub fn fire(&mut self, arm: ArmId) -> bool {
        match &self.pending {
            Some(pending) if pending.arm == arm => {
                self.pending = None;
                true
            }
            _ => {
                debug!("Ignoring stale watchdog fire ({})", arm.as_u64());
                false
            }
        }
    }
}

impl Drop for TimeoutWatchdog {
    fn drop(&mut self) {
        self.disarm();
    }
}
