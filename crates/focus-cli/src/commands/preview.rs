use clap::ValueEnum;
use focus_core::alert::{synthesize, RodioSink};
use focus_core::AlertKind;

#[derive(Clone, Copy, ValueEnum)]
pub enum SoundArg {
    /// Played when a work phase ends
    WorkToBreak,
    /// Played when a break ends
    BreakToWork,
    /// The focus reminder beep
    FocusReminder,
}

impl From<SoundArg> for AlertKind {
    fn from(arg: SoundArg) -> Self {
        match arg {
            SoundArg::WorkToBreak => AlertKind::WorkToBreak,
            SoundArg::BreakToWork => AlertKind::BreakToWork,
            SoundArg::FocusReminder => AlertKind::FocusReminder,
        }
    }
}

pub fn run(kind: SoundArg) -> Result<(), Box<dyn std::error::Error>> {
    RodioSink::play_to_end(&synthesize(kind.into()))?;
    Ok(())
}
