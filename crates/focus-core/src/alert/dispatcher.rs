use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use super::synth::{synthesize, AlertKind, SampleBuffer};
use crate::error::AlertError;

/// Plays sample buffers. Must not block the caller on device setup.
///
/// A new buffer stops whatever the sink was playing before.
pub trait AudioSink: Send + Sync {
    fn play(&self, buffer: SampleBuffer) -> Result<(), AlertError>;
}

/// Delivers a best-effort OS notification.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<(), AlertError>;
}

/// Sink that drops everything. For headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&self, _buffer: SampleBuffer) -> Result<(), AlertError> {
        Ok(())
    }
}

impl NotificationSink for Silent {
    fn notify(&self, _title: &str, _body: &str) -> Result<(), AlertError> {
        Ok(())
    }
}

/// Fans alerts out to the audio and notification sinks.
///
/// Failures are logged and swallowed; callers never see them.
pub struct AlertDispatcher {
    audio: Arc<dyn AudioSink>,
    notifier: Arc<dyn NotificationSink>,
    buffers: [OnceLock<SampleBuffer>; 3],
}

impl AlertDispatcher {
    pub fn new(audio: Arc<dyn AudioSink>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            audio,
            notifier,
            buffers: Default::default(),
        }
    }

    pub fn silent() -> Self {
        Self::new(Arc::new(Silent), Arc::new(Silent))
    }

    /// Synthesized buffer for `kind`, computed on first use.
    pub fn buffer(&self, kind: AlertKind) -> &SampleBuffer {
        self.buffers[kind.index()].get_or_init(|| synthesize(kind))
    }

    pub fn play(&self, kind: AlertKind) {
        let buffer = self.buffer(kind).clone();
        match self.audio.play(buffer) {
            Ok(()) => debug!(?kind, "alert played"),
            Err(e) => warn!(?kind, error = %e, "alert sound skipped"),
        }
    }

    pub fn notify(&self, title: &str, body: &str) {
        if let Err(e) = self.notifier.notify(title, body) {
            warn!(title, error = %e, "notification skipped");
        }
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher").finish_non_exhaustive()
    }
}
