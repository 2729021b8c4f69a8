//! Deterministic virtual-clock timer driver.
//!
//! Nothing fires on its own: the caller pops due timers and feeds their ids to
//! the session. Used to simulate whole sessions without waiting in real time.
//!
//! ```ignore
//! let timers = ManualTimers::new();
//! let mut machine = SessionMachine::new(config, reminders, Box::new(timers.clone()), alerts, reporter);
//! machine.toggle();
//! let until = timers.now() + Duration::from_secs(60);
//! while let Some(id) = timers.pop_due(until) {
//!     machine.on_timer(id);
//! }
//! timers.settle(until);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::clock::{TimerHandle, TimerId, TimerSchedule, TimerService};

#[derive(Debug, Clone, Copy)]
struct Armed {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    now: Duration,
    next_id: u64,
    armed: Vec<Armed>,
}

/// Cloneable handle to a shared virtual clock.
#[derive(Debug, Clone, Default)]
pub struct ManualTimers {
    inner: Arc<Mutex<Inner>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current virtual time since the driver was created.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of live timers, repeating and one-shot.
    pub fn armed(&self) -> usize {
        self.lock().armed.len()
    }

    /// Number of live one-shot timers.
    pub fn armed_once(&self) -> usize {
        self.lock().armed.iter().filter(|a| a.period.is_none()).count()
    }

    /// Number of live repeating timers.
    pub fn armed_repeating(&self) -> usize {
        self.lock().armed.iter().filter(|a| a.period.is_some()).count()
    }

    /// Delay until the given one-shot timer fires, if it is still armed.
    pub fn remaining(&self, id: TimerId) -> Option<Duration> {
        let inner = self.lock();
        inner
            .armed
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.due.saturating_sub(inner.now))
    }

    /// Fire the earliest timer due at or before `deadline`.
    ///
    /// Advances the clock to that timer's due time. Repeating timers are
    /// re-armed one period later; one-shots are removed. Ties break by id.
    pub fn pop_due(&self, deadline: Duration) -> Option<TimerId> {
        let mut inner = self.lock();
        let idx = inner
            .armed
            .iter()
            .enumerate()
            .filter(|(_, a)| a.due <= deadline)
            .min_by_key(|(_, a)| (a.due, a.id))
            .map(|(i, _)| i)?;
        let fired = inner.armed[idx];
        inner.now = inner.now.max(fired.due);
        match fired.period {
            Some(period) => inner.armed[idx].due = fired.due + period,
            None => {
                inner.armed.swap_remove(idx);
            }
        }
        Some(fired.id)
    }

    /// Move the clock forward to `deadline` without firing anything.
    pub fn settle(&self, deadline: Duration) {
        let mut inner = self.lock();
        inner.now = inner.now.max(deadline);
    }
}

impl TimerService for ManualTimers {
    fn schedule(&mut self, when: TimerSchedule) -> TimerHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = TimerId::new(inner.next_id);
        let (due, period) = match when {
            TimerSchedule::Every(p) => (inner.now + p, Some(p)),
            TimerSchedule::After(d) => (inner.now + d, None),
        };
        inner.armed.push(Armed { id, due, period });
        drop(inner);

        let shared = self.inner.clone();
        TimerHandle::new(id, move || {
            let mut inner = shared.lock().unwrap_or_else(PoisonError::into_inner);
            inner.armed.retain(|a| a.id != id);
        })
    }
}
