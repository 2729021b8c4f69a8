use std::io::Write;
use std::sync::Arc;

use clap::Args;
use focus_core::alert::{DesktopNotifier, RodioSink};
use focus_core::timer::NullReporter;
use focus_core::{
    runtime, AlertDispatcher, Config, Event, Phase, ReminderScheduler, SessionConfig,
    StatusReporter,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Args)]
pub struct RunArgs {
    /// Work phase length in minutes (overrides config)
    #[arg(long)]
    work_minutes: Option<u64>,
    /// Break phase length in minutes (overrides config)
    #[arg(long)]
    break_minutes: Option<u64>,
    /// Print session events as JSON lines instead of a live status line
    #[arg(long)]
    json: bool,
}

/// Rewrites a single terminal line on every status change.
struct TerminalReporter;

impl StatusReporter for TerminalReporter {
    fn report(&mut self, status: &str) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r\x1b[2K{status}");
        let _ = out.flush();
    }
}

fn announcement(event: &Event) -> Option<&'static str> {
    match event {
        Event::PhaseChanged { to: Phase::Break, .. } => Some("Break time!"),
        Event::PhaseChanged { to: Phase::Work, .. } => Some("Work time!"),
        Event::ReminderBeep { beep: 2, .. } => Some("Stay focused!"),
        _ => None,
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(minutes) = args.work_minutes {
        config.session.work_minutes = minutes;
    }
    if let Some(minutes) = args.break_minutes {
        config.session.break_minutes = minutes;
    }
    let session = config.session_config()?;
    let reminders = ReminderScheduler::new(config.reminder_config()?);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(interactive(session, reminders, args.json))
}

async fn interactive(
    config: SessionConfig,
    reminders: ReminderScheduler,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let alerts = AlertDispatcher::new(
        Arc::new(RodioSink::new()),
        Arc::new(DesktopNotifier::default()),
    );
    let reporter: Box<dyn StatusReporter> = if json {
        Box::new(NullReporter)
    } else {
        eprintln!("[enter] start/pause  [r] reset  [s] status  [q] quit");
        Box::new(TerminalReporter)
    };
    let (session, mut events, task) = runtime::spawn(config, reminders, alerts, reporter);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line?.as_deref().map(str::trim) {
                None | Some("q") | Some("quit") => break,
                Some("") | Some("t") | Some("toggle") => session.toggle()?,
                Some("r") | Some("reset") => session.reset()?,
                Some("s") | Some("status") => {
                    let snapshot = session.snapshot().await?;
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                }
                Some(other) => eprintln!("unknown command: {other}"),
            },
            Some(event) = events.recv() => {
                if json {
                    println!("{}", serde_json::to_string(&event)?);
                } else if let Some(message) = announcement(&event) {
                    println!("\r\x1b[2K{message}");
                }
            }
        }
    }

    debug!("shutting down session");
    session.shutdown()?;
    task.await?;
    if !json {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn announces_phase_changes_and_second_beep() {
        let at = Utc::now();
        let to_break = Event::PhaseChanged {
            from: Phase::Work,
            to: Phase::Break,
            duration_secs: 1_200,
            at,
        };
        assert_eq!(announcement(&to_break), Some("Break time!"));
        assert_eq!(announcement(&Event::ReminderBeep { beep: 1, at }), None);
        assert_eq!(
            announcement(&Event::ReminderBeep { beep: 2, at }),
            Some("Stay focused!")
        );
        assert_eq!(announcement(&Event::TimerReset { at }), None);
    }
}
