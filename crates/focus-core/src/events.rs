use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change in the session produces an Event.
/// The shell prints them; the status string is pushed separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: Phase,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A phase ran to completion and the next one began.
    PhaseChanged {
        from: Phase,
        to: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// One beep of the mid-work reminder sequence (1 or 2).
    ReminderBeep {
        beep: u8,
        at: DateTime<Utc>,
    },
}
