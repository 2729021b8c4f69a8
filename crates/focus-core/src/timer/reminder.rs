//! Randomized "stay focused" reminders during the work phase.
//!
//! The scheduler owns at most one armed one-shot at a time. A reminder cycle
//! is two stages: after a random wait it plays the first beep and arms a short
//! gap timer; when that fires it plays the second beep, sends a notification
//! and re-arms a fresh random wait. Every fire re-checks that the session is
//! still running in the work phase before making any noise.

use std::fmt;
use std::time::Duration;

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::clock::{TimerHandle, TimerId, TimerSchedule, TimerService};
use super::schedule::Phase;
use crate::alert::{AlertDispatcher, AlertKind};
use crate::error::ConfigError;

pub const REMINDER_TITLE: &str = "Focus Reminder";
pub const REMINDER_BODY: &str = "Stay Focused!";

/// Bounds for the random wait and the gap between the two beeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReminderConfig")]
pub struct ReminderConfig {
    min_interval: Duration,
    max_interval: Duration,
    beep_gap: Duration,
}

impl ReminderConfig {
    pub const DEFAULT_MIN: Duration = Duration::from_secs(180);
    pub const DEFAULT_MAX: Duration = Duration::from_secs(300);
    pub const DEFAULT_BEEP_GAP: Duration = Duration::from_secs(10);

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero minimum interval or a
    /// minimum greater than the maximum.
    pub fn new(
        min_interval: Duration,
        max_interval: Duration,
        beep_gap: Duration,
    ) -> Result<Self, ConfigError> {
        if min_interval.is_zero() {
            return Err(ConfigError::invalid("min_interval", "must be greater than zero"));
        }
        if min_interval > max_interval {
            return Err(ConfigError::invalid(
                "max_interval",
                format!(
                    "must be at least min_interval ({}s)",
                    min_interval.as_secs_f64()
                ),
            ));
        }
        Ok(Self {
            min_interval,
            max_interval,
            beep_gap,
        })
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    pub fn beep_gap(&self) -> Duration {
        self.beep_gap
    }
}

#[derive(Deserialize)]
struct RawReminderConfig {
    min_interval: Duration,
    max_interval: Duration,
    beep_gap: Duration,
}

impl TryFrom<RawReminderConfig> for ReminderConfig {
    type Error = ConfigError;

    fn try_from(raw: RawReminderConfig) -> Result<Self, Self::Error> {
        Self::new(raw.min_interval, raw.max_interval, raw.beep_gap)
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            min_interval: Self::DEFAULT_MIN,
            max_interval: Self::DEFAULT_MAX,
            beep_gap: Self::DEFAULT_BEEP_GAP,
        }
    }
}

/// What the scheduler needs to know about the session to decide whether a
/// reminder may sound. Read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub running: bool,
    pub phase: Phase,
}

impl SessionView {
    pub fn in_running_work(self) -> bool {
        self.running && self.phase == Phase::Work
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Waiting out the random interval.
    Waiting,
    /// First beep played; waiting out the gap before the second.
    SecondBeep,
}

/// The single outstanding reminder fire.
#[derive(Debug)]
pub struct ReminderTimer {
    handle: TimerHandle,
    interval: Duration,
    stage: Stage,
}

impl ReminderTimer {
    pub fn id(&self) -> TimerId {
        self.handle.id()
    }

    /// The random interval drawn for this reminder cycle.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True between the first and second beep.
    pub fn is_mid_sequence(&self) -> bool {
        self.stage == Stage::SecondBeep
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    FirstBeep,
    /// Sequence complete; `next` is the freshly drawn interval, if re-armed.
    SecondBeep { next: Option<Duration> },
    /// The session left running work while the timer was pending.
    Skipped,
}

pub struct ReminderScheduler {
    config: ReminderConfig,
    rng: Box<dyn RngCore + Send>,
    timer: Option<ReminderTimer>,
}

impl ReminderScheduler {
    pub fn new(config: ReminderConfig) -> Self {
        Self::with_rng(config, Mcg128Xsl64::from_entropy())
    }

    /// Reproducible interval sequence.
    pub fn seeded(config: ReminderConfig, seed: u64) -> Self {
        Self::with_rng(config, Mcg128Xsl64::seed_from_u64(seed))
    }

    pub fn with_rng(config: ReminderConfig, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            config,
            rng: Box::new(rng),
            timer: None,
        }
    }

    pub fn pending(&self) -> Option<&ReminderTimer> {
        self.timer.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Uniform draw from `[min_interval, max_interval]` at millisecond resolution.
    pub fn draw_interval(&mut self) -> Duration {
        let lo = millis(self.config.min_interval);
        let hi = millis(self.config.max_interval);
        Duration::from_millis(self.rng.gen_range(lo..=hi))
    }

    /// Arm a fresh reminder if the session is running in the work phase.
    ///
    /// Any previously armed timer is cancelled first, whether or not a new
    /// one is armed. Returns the drawn interval.
    pub fn start(&mut self, session: SessionView, timers: &mut dyn TimerService) -> Option<Duration> {
        self.cancel();
        if !session.in_running_work() {
            return None;
        }
        let interval = self.draw_interval();
        let handle = timers.schedule(TimerSchedule::After(interval));
        debug!(id = %handle.id(), interval_secs = interval.as_secs_f64(), "reminder armed");
        self.timer = Some(ReminderTimer {
            handle,
            interval,
            stage: Stage::Waiting,
        });
        Some(interval)
    }

    /// Drop the outstanding timer, if any. Safe to call at any time.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!(id = %timer.id(), "reminder cancelled");
        }
    }

    /// Whether `id` is the currently armed reminder.
    pub fn owns(&self, id: TimerId) -> bool {
        self.timer.as_ref().is_some_and(|t| t.id() == id)
    }

    /// Handle a delivered timer. Returns `None` if `id` is not ours.
    pub fn on_fire(
        &mut self,
        id: TimerId,
        session: SessionView,
        timers: &mut dyn TimerService,
        alerts: &AlertDispatcher,
    ) -> Option<ReminderOutcome> {
        if !self.owns(id) {
            trace!(%id, "stale reminder fire ignored");
            return None;
        }
        let fired = self.timer.take()?;

        if !session.in_running_work() {
            debug!(%id, "reminder skipped, session left running work");
            return Some(ReminderOutcome::Skipped);
        }

        match fired.stage {
            Stage::Waiting => {
                alerts.play(AlertKind::FocusReminder);
                let handle = timers.schedule(TimerSchedule::After(self.config.beep_gap));
                self.timer = Some(ReminderTimer {
                    handle,
                    interval: fired.interval,
                    stage: Stage::SecondBeep,
                });
                Some(ReminderOutcome::FirstBeep)
            }
            Stage::SecondBeep => {
                alerts.play(AlertKind::FocusReminder);
                alerts.notify(REMINDER_TITLE, REMINDER_BODY);
                let next = self.start(session, timers);
                Some(ReminderOutcome::SecondBeep { next })
            }
        }
    }
}

impl fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("config", &self.config)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::RecordingSink;
    use crate::timer::ManualTimers;
    use proptest::prelude::*;

    const WORKING: SessionView = SessionView {
        running: true,
        phase: Phase::Work,
    };

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn deserialize_rejects_inverted_range() {
        let inverted = r#"{
            "min_interval": {"secs": 300, "nanos": 0},
            "max_interval": {"secs": 10, "nanos": 0},
            "beep_gap": {"secs": 10, "nanos": 0}
        }"#;
        let err = serde_json::from_str::<ReminderConfig>(inverted).unwrap_err();
        assert!(err.to_string().contains("max_interval"), "{err}");

        let json = serde_json::to_string(&ReminderConfig::default()).unwrap();
        let parsed: ReminderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ReminderConfig::default());
    }

    #[test]
    fn start_arms_one_timer_in_range() {
        let mut timers = ManualTimers::new();
        let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), 1);
        let interval = sched.start(WORKING, &mut timers).unwrap();
        assert!((secs(180)..=secs(300)).contains(&interval));
        assert_eq!(timers.armed_once(), 1);
        let id = sched.pending().unwrap().id();
        assert_eq!(timers.remaining(id), Some(interval));
    }

    #[test]
    fn restart_replaces_previous_timer() {
        let mut timers = ManualTimers::new();
        let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), 2);
        sched.start(WORKING, &mut timers);
        let first = sched.pending().unwrap().id();
        sched.start(WORKING, &mut timers);
        let second = sched.pending().unwrap().id();
        assert_ne!(first, second);
        assert_eq!(timers.armed(), 1);
        assert!(timers.remaining(first).is_none());
    }

    #[test]
    fn start_outside_running_work_arms_nothing() {
        let mut timers = ManualTimers::new();
        let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), 3);
        let paused = SessionView { running: false, phase: Phase::Work };
        let resting = SessionView { running: true, phase: Phase::Break };
        assert!(sched.start(paused, &mut timers).is_none());
        assert!(sched.start(resting, &mut timers).is_none());
        assert_eq!(timers.armed(), 0);
    }

    #[test]
    fn start_outside_work_still_cancels_existing() {
        let mut timers = ManualTimers::new();
        let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), 3);
        sched.start(WORKING, &mut timers);
        let resting = SessionView { running: true, phase: Phase::Break };
        sched.start(resting, &mut timers);
        assert!(!sched.is_armed());
        assert_eq!(timers.armed(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut timers = ManualTimers::new();
        let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), 4);
        sched.cancel();
        sched.start(WORKING, &mut timers);
        sched.cancel();
        sched.cancel();
        assert!(!sched.is_armed());
        assert_eq!(timers.armed(), 0);
    }

    #[test]
    fn full_sequence_beeps_twice_then_rearms() {
        let mut timers = ManualTimers::new();
        let rec = RecordingSink::new();
        let alerts = rec.dispatcher();
        let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), 5);
        let interval = sched.start(WORKING, &mut timers).unwrap();

        let id = timers.pop_due(secs(1_000)).unwrap();
        assert_eq!(timers.now(), interval);
        assert_eq!(
            sched.on_fire(id, WORKING, &mut timers, &alerts),
            Some(ReminderOutcome::FirstBeep)
        );
        assert_eq!(rec.count(AlertKind::FocusReminder), 1);
        assert!(rec.notifications().is_empty());
        assert!(sched.pending().unwrap().is_mid_sequence());

        let id = timers.pop_due(secs(1_000)).unwrap();
        assert_eq!(timers.now(), interval + secs(10));
        let outcome = sched.on_fire(id, WORKING, &mut timers, &alerts).unwrap();
        let ReminderOutcome::SecondBeep { next: Some(next) } = outcome else {
            panic!("expected re-arm, got {outcome:?}");
        };
        assert!((secs(180)..=secs(300)).contains(&next));
        assert_eq!(rec.count(AlertKind::FocusReminder), 2);
        assert_eq!(
            rec.notifications(),
            vec![(REMINDER_TITLE.to_string(), REMINDER_BODY.to_string())]
        );
        assert_eq!(timers.armed(), 1);
        assert!(!sched.pending().unwrap().is_mid_sequence());
    }

    #[test]
    fn second_beep_rechecks_session() {
        let mut timers = ManualTimers::new();
        let rec = RecordingSink::new();
        let alerts = rec.dispatcher();
        let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), 6);
        sched.start(WORKING, &mut timers);

        let id = timers.pop_due(secs(1_000)).unwrap();
        sched.on_fire(id, WORKING, &mut timers, &alerts);

        let id = timers.pop_due(secs(1_000)).unwrap();
        let paused = SessionView { running: false, phase: Phase::Work };
        assert_eq!(
            sched.on_fire(id, paused, &mut timers, &alerts),
            Some(ReminderOutcome::Skipped)
        );
        assert_eq!(rec.count(AlertKind::FocusReminder), 1);
        assert!(rec.notifications().is_empty());
        assert!(!sched.is_armed());
    }

    #[test]
    fn foreign_or_stale_ids_are_ignored() {
        let mut timers = ManualTimers::new();
        let rec = RecordingSink::new();
        let alerts = rec.dispatcher();
        let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), 7);
        sched.start(WORKING, &mut timers);
        let stale = sched.pending().unwrap().id();
        sched.start(WORKING, &mut timers);

        assert_eq!(sched.on_fire(stale, WORKING, &mut timers, &alerts), None);
        assert_eq!(sched.on_fire(TimerId::new(999), WORKING, &mut timers, &alerts), None);
        assert!(rec.sounds().is_empty());
        assert!(sched.is_armed());
    }

    #[test]
    fn short_test_range_is_configurable() {
        let config = ReminderConfig::new(secs(15), secs(15), secs(10)).unwrap();
        let mut timers = ManualTimers::new();
        let mut sched = ReminderScheduler::seeded(config, 8);
        assert_eq!(sched.start(WORKING, &mut timers), Some(secs(15)));
    }

    #[test]
    fn invalid_ranges_rejected() {
        assert!(ReminderConfig::new(Duration::ZERO, secs(10), secs(10)).is_err());
        assert!(ReminderConfig::new(secs(301), secs(300), secs(10)).is_err());
    }

    proptest! {
        #[test]
        fn intervals_always_within_bounds(seed in any::<u64>()) {
            let mut sched = ReminderScheduler::seeded(ReminderConfig::default(), seed);
            for _ in 0..16 {
                let d = sched.draw_interval();
                prop_assert!(d >= secs(180) && d <= secs(300), "drew {:?}", d);
            }
        }
    }
}
