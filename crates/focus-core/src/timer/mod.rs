mod clock;
mod engine;
mod manual;
mod reminder;
mod schedule;
mod status;

pub use clock::{TimerHandle, TimerId, TimerSchedule, TimerService};
pub use engine::{SessionMachine, Snapshot, TICK};
pub use manual::ManualTimers;
pub use reminder::{
    ReminderConfig, ReminderOutcome, ReminderScheduler, ReminderTimer, SessionView,
    REMINDER_BODY, REMINDER_TITLE,
};
pub use schedule::{Phase, SessionConfig};
pub use status::{format_hms, NullReporter, SessionStatus, StatusReporter};
