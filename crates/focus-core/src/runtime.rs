//! Tokio session execution context.
//!
//! One task owns the [`SessionMachine`] and is the only place it is touched.
//! User commands and timer fires arrive over channels and are applied one at
//! a time, so no two ticks or reminder fires ever run concurrently.
//!
//! ```ignore
//! let (session, mut events, task) = runtime::spawn(machine_parts...);
//! session.toggle()?;
//! while let Some(event) = events.recv().await { /* render */ }
//! ```

use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::alert::AlertDispatcher;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::timer::{
    ReminderScheduler, SessionConfig, SessionMachine, Snapshot, StatusReporter, TimerHandle,
    TimerId, TimerSchedule, TimerService,
};

/// Events held for a slow consumer before new ones are dropped.
pub const EVENT_BUFFER: usize = 64;

#[derive(Debug)]
enum Command {
    Toggle,
    Reset,
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

/// Timer service backed by tokio tasks.
///
/// Each armed timer is a task that sends its id back to the session when
/// due. Cancelling aborts the task; an id already in the channel is dropped
/// by the session as stale.
#[derive(Debug)]
pub struct TokioTimers {
    runtime: Handle,
    fired: mpsc::UnboundedSender<TimerId>,
    next_id: u64,
}

impl TokioTimers {
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(fired: mpsc::UnboundedSender<TimerId>) -> Self {
        Self {
            runtime: Handle::current(),
            fired,
            next_id: 0,
        }
    }
}

impl TimerService for TokioTimers {
    fn schedule(&mut self, when: TimerSchedule) -> TimerHandle {
        self.next_id += 1;
        let id = TimerId::new(self.next_id);
        let fired = self.fired.clone();

        let task = self.runtime.spawn(async move {
            match when {
                TimerSchedule::Every(period) => {
                    let mut ticker = time::interval_at(Instant::now() + period, period);
                    loop {
                        ticker.tick().await;
                        if fired.send(id).is_err() {
                            break;
                        }
                    }
                }
                TimerSchedule::After(delay) => {
                    time::sleep(delay).await;
                    let _ = fired.send(id);
                }
            }
        });

        let abort = task.abort_handle();
        TimerHandle::new(id, move || abort.abort())
    }
}

/// Cloneable control surface for a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| CoreError::SessionClosed)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    /// Ask the session task to stop. Outstanding timers are cancelled.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| CoreError::SessionClosed)
    }
}

/// Spawn the session task on the current tokio runtime.
///
/// Returns the control handle, the event stream and the task. The task ends
/// on [`SessionHandle::shutdown`] or once every handle is dropped. The event
/// stream holds at most [`EVENT_BUFFER`] unread events; later ones are
/// dropped until the receiver catches up.
pub fn spawn(
    config: SessionConfig,
    reminders: ReminderScheduler,
    alerts: AlertDispatcher,
    reporter: Box<dyn StatusReporter>,
) -> (SessionHandle, mpsc::Receiver<Event>, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (fired_tx, fired_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

    let machine = SessionMachine::new(
        config,
        reminders,
        Box::new(TokioTimers::new(fired_tx)),
        alerts,
        reporter,
    );
    let task = tokio::spawn(run(machine, command_rx, fired_rx, event_tx));

    (
        SessionHandle {
            commands: command_tx,
        },
        event_rx,
        task,
    )
}

async fn run(
    mut machine: SessionMachine,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut fired: mpsc::UnboundedReceiver<TimerId>,
    events: mpsc::Sender<Event>,
) {
    machine.publish_status();

    loop {
        let event = tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Toggle) => Some(machine.toggle()),
                Some(Command::Reset) => Some(machine.reset()),
                Some(Command::Snapshot(reply)) => {
                    let _ = reply.send(machine.snapshot());
                    None
                }
                Some(Command::Shutdown) | None => break,
            },
            Some(id) = fired.recv() => machine.on_timer(id),
        };

        if let Some(event) = event {
            debug!(?event, "session event");
            match events.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(event)) => warn!(?event, "event stream full, dropping"),
                // The shell may not care about events.
                Err(TrySendError::Closed(_)) => {}
            }
        }
    }

    debug!("session task stopped");
}
