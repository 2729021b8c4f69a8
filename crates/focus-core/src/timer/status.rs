use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::schedule::Phase;

/// Observable session state, one variant per machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "elapsed_secs", rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    RunningWork(u64),
    PausedWork(u64),
    RunningBreak(u64),
    PausedBreak(u64),
}

impl SessionStatus {
    pub fn is_running(self) -> bool {
        matches!(self, SessionStatus::RunningWork(_) | SessionStatus::RunningBreak(_))
    }

    /// The status line shown to the user.
    pub fn line(self) -> String {
        match self {
            SessionStatus::Idle => "Ready to start".to_string(),
            SessionStatus::PausedWork(_) | SessionStatus::PausedBreak(_) => "Paused".to_string(),
            SessionStatus::RunningWork(s) => format!("Working... {}", format_hms(s)),
            SessionStatus::RunningBreak(s) => format!("Resting... {}", format_hms(s)),
        }
    }

    pub(crate) fn from_parts(running: bool, started: bool, phase: Phase, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs();
        match (started, running, phase) {
            (false, _, _) => SessionStatus::Idle,
            (true, true, Phase::Work) => SessionStatus::RunningWork(secs),
            (true, false, Phase::Work) => SessionStatus::PausedWork(secs),
            (true, true, Phase::Break) => SessionStatus::RunningBreak(secs),
            (true, false, Phase::Break) => SessionStatus::PausedBreak(secs),
        }
    }
}

/// `HH:MM:SS`, zero padded. Hours grow past two digits if needed.
pub fn format_hms(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Receives the status line after every state change.
pub trait StatusReporter: Send {
    fn report(&mut self, status: &str);
}

impl<F> StatusReporter for F
where
    F: FnMut(&str) + Send,
{
    fn report(&mut self, status: &str) {
        self(status)
    }
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl StatusReporter for NullReporter {
    fn report(&mut self, _status: &str) {}
}
