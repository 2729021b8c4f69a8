//! Session state machine.
//!
//! Owns the single source of truth for the session: running or paused, the
//! current phase and the time elapsed in it. It does not keep time itself.
//! Entering a running state arms a 1 Hz repeating timer through the injected
//! [`TimerService`]; the driver feeds each fire back through [`on_timer`],
//! which advances the clock by one second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --toggle--> RunningWork <--toggle--> PausedWork
//!                      |  ^
//!         work elapsed |  | break elapsed
//!                      v  |
//!                  RunningBreak <--toggle--> PausedBreak
//!
//! any --reset--> Idle
//! ```
//!
//! [`on_timer`]: SessionMachine::on_timer

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::clock::{TimerHandle, TimerId, TimerSchedule, TimerService};
use super::reminder::{ReminderOutcome, ReminderScheduler, SessionView};
use super::schedule::{length_adjective, length_noun, Phase, SessionConfig};
use super::status::{SessionStatus, StatusReporter};
use crate::alert::{AlertDispatcher, AlertKind};
use crate::events::Event;

/// Period of the main heartbeat.
pub const TICK: Duration = Duration::from_secs(1);

/// Point-in-time view of the session, for display or JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: SessionStatus,
    pub phase: Phase,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    pub line: String,
    pub reminder_armed: bool,
}

pub struct SessionMachine {
    config: SessionConfig,
    running: bool,
    /// False only in Idle; distinguishes Idle from a pause at 0s.
    started: bool,
    phase: Phase,
    elapsed: Duration,
    tick: Option<TimerHandle>,
    reminders: ReminderScheduler,
    timers: Box<dyn TimerService>,
    alerts: AlertDispatcher,
    reporter: Box<dyn StatusReporter>,
}

impl SessionMachine {
    /// Create a machine in the `Idle` state.
    pub fn new(
        config: SessionConfig,
        reminders: ReminderScheduler,
        timers: Box<dyn TimerService>,
        alerts: AlertDispatcher,
        reporter: Box<dyn StatusReporter>,
    ) -> Self {
        Self {
            config,
            running: false,
            started: false,
            phase: Phase::Work,
            elapsed: Duration::ZERO,
            tick: None,
            reminders,
            timers,
            alerts,
            reporter,
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::from_parts(self.running, self.started, self.phase, self.elapsed)
    }

    pub fn status_line(&self) -> String {
        self.status().line()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time left in the current phase.
    pub fn remaining(&self) -> Duration {
        self.config.duration(self.phase).saturating_sub(self.elapsed)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_ticking(&self) -> bool {
        self.tick.is_some()
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    pub fn snapshot(&self) -> Snapshot {
        let status = self.status();
        Snapshot {
            status,
            phase: self.phase,
            elapsed_secs: self.elapsed.as_secs(),
            remaining_secs: self.remaining().as_secs(),
            line: status.line(),
            reminder_armed: self.reminders.is_armed(),
        }
    }

    fn view(&self) -> SessionView {
        SessionView {
            running: self.running,
            phase: self.phase,
        }
    }

    /// Start, pause or resume.
    pub fn toggle(&mut self) -> Event {
        let event = if self.running { self.pause() } else { self.run() };
        self.publish_status();
        self.check_invariants();
        event
    }

    /// Back to `Idle` from anywhere.
    pub fn reset(&mut self) -> Event {
        self.tick = None;
        self.reminders.cancel();
        self.running = false;
        self.started = false;
        self.phase = Phase::Work;
        self.elapsed = Duration::ZERO;
        debug!("session reset");
        self.publish_status();
        self.check_invariants();
        Event::TimerReset { at: Utc::now() }
    }

    /// Advance one second. Does nothing unless running.
    ///
    /// Returns `Some(Event::PhaseChanged)` when the current phase completes.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            trace!("tick ignored while not running");
            return None;
        }
        self.elapsed += TICK;
        let event = if self.elapsed >= self.config.duration(self.phase) {
            Some(self.complete_phase())
        } else {
            None
        };
        debug_assert!(self.elapsed < self.config.duration(self.phase));
        self.publish_status();
        self.check_invariants();
        event
    }

    /// Route a delivered timer to the heartbeat or the reminder scheduler.
    ///
    /// Ids that match neither are stale fires from a cancelled timer and are
    /// dropped.
    pub fn on_timer(&mut self, id: TimerId) -> Option<Event> {
        if self.tick.as_ref().is_some_and(|t| t.id() == id) {
            return self.tick();
        }
        let view = self.view();
        let outcome = self
            .reminders
            .on_fire(id, view, self.timers.as_mut(), &self.alerts)?;
        let beep = match outcome {
            ReminderOutcome::FirstBeep => 1,
            ReminderOutcome::SecondBeep { .. } => 2,
            ReminderOutcome::Skipped => return None,
        };
        Some(Event::ReminderBeep {
            beep,
            at: Utc::now(),
        })
    }

    /// Push the current status line to the reporter.
    pub fn publish_status(&mut self) {
        let line = self.status_line();
        self.reporter.report(&line);
    }

    fn run(&mut self) -> Event {
        let resumed = self.started;
        self.running = true;
        self.started = true;
        self.tick = Some(self.timers.schedule(TimerSchedule::Every(TICK)));
        if self.phase == Phase::Work {
            let view = self.view();
            self.reminders.start(view, self.timers.as_mut());
        }
        debug!(phase = ?self.phase, elapsed_secs = self.elapsed.as_secs(), resumed, "session running");

        if resumed {
            Event::TimerResumed {
                phase: self.phase,
                elapsed_secs: self.elapsed.as_secs(),
                at: Utc::now(),
            }
        } else {
            Event::TimerStarted {
                phase: self.phase,
                duration_secs: self.config.duration(self.phase).as_secs(),
                at: Utc::now(),
            }
        }
    }

    fn pause(&mut self) -> Event {
        self.running = false;
        self.tick = None;
        self.reminders.cancel();
        debug!(phase = ?self.phase, elapsed_secs = self.elapsed.as_secs(), "session paused");
        Event::TimerPaused {
            phase: self.phase,
            elapsed_secs: self.elapsed.as_secs(),
            at: Utc::now(),
        }
    }

    fn complete_phase(&mut self) -> Event {
        let from = self.phase;
        let to = from.next();
        self.phase = to;
        self.elapsed = Duration::ZERO;
        debug!(?from, ?to, "phase complete");

        match to {
            Phase::Break => {
                self.alerts.play(AlertKind::WorkToBreak);
                let body = format!("Take a {} break", length_adjective(self.config.break_duration()));
                self.alerts.notify("Break Time", &body);
                self.reminders.cancel();
            }
            Phase::Work => {
                self.alerts.play(AlertKind::BreakToWork);
                let body = format!("Focus for {}", length_noun(self.config.work_duration()));
                self.alerts.notify("Work Time", &body);
                let view = self.view();
                self.reminders.start(view, self.timers.as_mut());
            }
        }

        Event::PhaseChanged {
            from,
            to,
            duration_secs: self.config.duration(to).as_secs(),
            at: Utc::now(),
        }
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.running || (self.tick.is_none() && !self.reminders.is_armed()),
            "stopped session still holds timers"
        );
        debug_assert!(self.started || (self.phase == Phase::Work && self.elapsed.is_zero()));
    }
}

impl std::fmt::Debug for SessionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMachine")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("tick", &self.tick)
            .field("reminders", &self.reminders)
            .finish_non_exhaustive()
    }
}
