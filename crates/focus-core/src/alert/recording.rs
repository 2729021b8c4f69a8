use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::dispatcher::{AlertDispatcher, AudioSink, NotificationSink};
use super::synth::{AlertKind, SampleBuffer};
use crate::error::AlertError;

#[derive(Debug, Default)]
struct Log {
    sounds: Vec<AlertKind>,
    notifications: Vec<(String, String)>,
}

/// Sink that remembers what it was asked to play and show.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    log: Arc<Mutex<Log>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher wired to this sink for both sound and notifications.
    pub fn dispatcher(&self) -> AlertDispatcher {
        AlertDispatcher::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sounds(&self) -> Vec<AlertKind> {
        self.log().sounds.clone()
    }

    pub fn count(&self, kind: AlertKind) -> usize {
        self.log().sounds.iter().filter(|k| **k == kind).count()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.log().notifications.clone()
    }
}

impl AudioSink for RecordingSink {
    fn play(&self, buffer: SampleBuffer) -> Result<(), AlertError> {
        self.log().sounds.push(buffer.kind());
        Ok(())
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, title: &str, body: &str) -> Result<(), AlertError> {
        self.log()
            .notifications
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}
