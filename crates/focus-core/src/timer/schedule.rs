use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    /// The phase that follows this one.
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }
}

/// Phase durations for a session. Immutable once built.
///
/// Durations are kept at whole-second granularity because the session
/// advances on a 1 Hz tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionConfig")]
pub struct SessionConfig {
    work_duration: Duration,
    break_duration: Duration,
}

impl SessionConfig {
    pub const DEFAULT_WORK: Duration = Duration::from_secs(90 * 60);
    pub const DEFAULT_BREAK: Duration = Duration::from_secs(20 * 60);

    /// Build a config, rejecting phases shorter than one second.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if either duration truncates to
    /// zero whole seconds.
    pub fn new(work_duration: Duration, break_duration: Duration) -> Result<Self, ConfigError> {
        let work_secs = work_duration.as_secs();
        let break_secs = break_duration.as_secs();
        if work_secs == 0 {
            return Err(ConfigError::invalid(
                "work_duration",
                "must be at least one second",
            ));
        }
        if break_secs == 0 {
            return Err(ConfigError::invalid(
                "break_duration",
                "must be at least one second",
            ));
        }
        Ok(Self {
            work_duration: Duration::from_secs(work_secs),
            break_duration: Duration::from_secs(break_secs),
        })
    }

    /// Convenience constructor from whole minutes.
    ///
    /// Uses saturating arithmetic so oversized values cannot overflow.
    pub fn from_minutes(work_min: u64, break_min: u64) -> Result<Self, ConfigError> {
        Self::new(
            Duration::from_secs(work_min.saturating_mul(60)),
            Duration::from_secs(break_min.saturating_mul(60)),
        )
    }

    pub fn work_duration(&self) -> Duration {
        self.work_duration
    }

    pub fn break_duration(&self) -> Duration {
        self.break_duration
    }

    pub fn duration(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Work => self.work_duration,
            Phase::Break => self.break_duration,
        }
    }
}

#[derive(Deserialize)]
struct RawSessionConfig {
    work_duration: Duration,
    break_duration: Duration,
}

impl TryFrom<RawSessionConfig> for SessionConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSessionConfig) -> Result<Self, Self::Error> {
        Self::new(raw.work_duration, raw.break_duration)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_duration: Self::DEFAULT_WORK,
            break_duration: Self::DEFAULT_BREAK,
        }
    }
}

/// Human phrase for a phase length: "20-minute" for whole minutes,
/// "45-second" otherwise.
pub(crate) fn length_adjective(d: Duration) -> String {
    let secs = d.as_secs();
    if secs % 60 == 0 {
        format!("{}-minute", secs / 60)
    } else {
        format!("{secs}-second")
    }
}

/// Plural form: "90 minutes", "1 minute", "30 seconds".
pub(crate) fn length_noun(d: Duration) -> String {
    let secs = d.as_secs();
    let (n, unit) = if secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
