//! Session runtime on a paused tokio clock.

use std::time::Duration;

use focus_core::alert::RecordingSink;
use focus_core::runtime;
use focus_core::timer::NullReporter;
use focus_core::{
    AlertKind, Event, Phase, ReminderConfig, ReminderScheduler, SessionConfig, SessionStatus,
};
use tokio::time::timeout;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[tokio::test(start_paused = true)]
async fn runtime_drives_phase_changes() {
    let alerts = RecordingSink::new();
    let (session, mut events, task) = runtime::spawn(
        SessionConfig::new(secs(2), secs(2)).unwrap(),
        ReminderScheduler::seeded(ReminderConfig::default(), 1),
        alerts.dispatcher(),
        Box::new(NullReporter),
    );

    session.toggle().unwrap();
    let mut changes = Vec::new();
    while changes.len() < 2 {
        let event = timeout(secs(10), events.recv())
            .await
            .expect("session stalled")
            .expect("event stream closed");
        if let Event::PhaseChanged { to, .. } = event {
            changes.push(to);
        }
    }

    assert_eq!(changes, vec![Phase::Break, Phase::Work]);
    assert_eq!(alerts.count(AlertKind::WorkToBreak), 1);
    assert_eq!(alerts.count(AlertKind::BreakToWork), 1);

    let snap = session.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Work);
    assert!(snap.status.is_running());

    session.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn paused_session_stops_ticking() {
    let (session, mut events, task) = runtime::spawn(
        SessionConfig::default(),
        ReminderScheduler::seeded(ReminderConfig::default(), 2),
        RecordingSink::new().dispatcher(),
        Box::new(NullReporter),
    );

    session.toggle().unwrap();
    session.toggle().unwrap();
    assert!(matches!(events.recv().await, Some(Event::TimerStarted { .. })));
    assert!(matches!(events.recv().await, Some(Event::TimerPaused { .. })));

    tokio::time::sleep(secs(600)).await;
    let snap = session.snapshot().await.unwrap();
    assert_eq!(snap.status, SessionStatus::PausedWork(0));
    assert!(!snap.reminder_armed);
    assert_eq!(snap.line, "Paused");

    drop(session);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reminder_fires_through_runtime() {
    let alerts = RecordingSink::new();
    let config = ReminderConfig::new(secs(15), secs(15), secs(10)).unwrap();
    let (session, mut events, task) = runtime::spawn(
        SessionConfig::default(),
        ReminderScheduler::seeded(config, 3),
        alerts.dispatcher(),
        Box::new(NullReporter),
    );

    session.toggle().unwrap();
    let mut beeps = Vec::new();
    while beeps.len() < 2 {
        let event = timeout(secs(60), events.recv()).await.unwrap().unwrap();
        if let Event::ReminderBeep { beep, .. } = event {
            beeps.push(beep);
        }
    }
    assert_eq!(beeps, vec![1, 2]);
    assert_eq!(alerts.count(AlertKind::FocusReminder), 2);
    assert_eq!(alerts.notifications().len(), 1);

    session.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unread_events_are_capped() {
    let (session, mut events, task) = runtime::spawn(
        SessionConfig::new(secs(1), secs(1)).unwrap(),
        ReminderScheduler::seeded(ReminderConfig::default(), 4),
        RecordingSink::new().dispatcher(),
        Box::new(NullReporter),
    );

    session.toggle().unwrap();
    // Roughly one phase change per second, far more than the buffer holds.
    tokio::time::sleep(secs(300)).await;
    let snap = session.snapshot().await.unwrap();
    assert!(snap.status.is_running());

    let mut queued = 0;
    while events.try_recv().is_ok() {
        queued += 1;
    }
    assert_eq!(queued, runtime::EVENT_BUFFER);

    session.shutdown().unwrap();
    task.await.unwrap();
}
