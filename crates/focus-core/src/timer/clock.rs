//! Scheduled-callback seam between the session and whatever drives time.
//!
//! The session never sleeps or spawns. It asks a [`TimerService`] to arm a
//! timer and gets back a [`TimerHandle`]; when the timer is due the driver
//! delivers its [`TimerId`] back into the session context. Dropping the handle
//! cancels the timer. A delivery whose id no longer matches a live handle is
//! stale and gets ignored, so a fire racing a cancel is harmless.

use std::fmt;
use std::time::Duration;

/// Identifies one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSchedule {
    /// Fire every `period`, first fire one period from now.
    Every(Duration),
    /// Fire once after the delay.
    After(Duration),
}

/// Owned handle to an armed timer. Cancels on drop.
pub struct TimerHandle {
    id: TimerId,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    pub fn new(id: TimerId, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").field("id", &self.id).finish()
    }
}

/// Arms timers on behalf of the session.
pub trait TimerService: Send {
    fn schedule(&mut self, when: TimerSchedule) -> TimerHandle;
}
