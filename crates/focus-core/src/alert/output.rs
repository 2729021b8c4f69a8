//! Concrete audio and notification sinks.

use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::OnceLock;
use std::thread;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use tracing::{debug, warn};

use super::dispatcher::{AudioSink, NotificationSink};
use super::synth::SampleBuffer;
use crate::error::AlertError;

/// Audio output through the default device.
///
/// The output stream lives on a dedicated thread that is started on the first
/// `play` and never again. `play` only hands the buffer to that thread, so the
/// caller is never blocked on device setup.
#[derive(Debug, Default)]
pub struct RodioSink {
    tx: OnceLock<Option<Sender<SampleBuffer>>>,
}

impl RodioSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play `buffer` on the calling thread and return once it has finished.
    ///
    /// Opens its own output stream, so device errors are reported instead of
    /// logged.
    pub fn play_to_end(buffer: &SampleBuffer) -> Result<(), AlertError> {
        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| AlertError::AudioUnavailable(e.to_string()))?;
        let sink =
            Sink::try_new(&handle).map_err(|e| AlertError::AudioUnavailable(e.to_string()))?;
        sink.append(source(buffer));
        sink.sleep_until_end();
        Ok(())
    }

    fn sender(&self) -> Option<&Sender<SampleBuffer>> {
        self.tx
            .get_or_init(|| {
                let (tx, rx) = mpsc::channel();
                match thread::Builder::new()
                    .name("focus-audio".into())
                    .spawn(move || audio_thread(rx))
                {
                    Ok(_) => Some(tx),
                    Err(e) => {
                        warn!(error = %e, "failed to start audio thread");
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl AudioSink for RodioSink {
    fn play(&self, buffer: SampleBuffer) -> Result<(), AlertError> {
        let tx = self
            .sender()
            .ok_or_else(|| AlertError::AudioUnavailable("audio thread not running".into()))?;
        tx.send(buffer)
            .map_err(|_| AlertError::AudioUnavailable("audio output closed".into()))
    }
}

fn audio_thread(rx: Receiver<SampleBuffer>) {
    // The stream must outlive every sink created from its handle.
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "no audio output device");
            return;
        }
    };
    debug!("audio output ready");

    let mut current: Option<Sink> = None;
    for buffer in rx {
        if let Some(previous) = current.take() {
            previous.stop();
        }
        match Sink::try_new(&handle) {
            Ok(sink) => {
                sink.append(source(&buffer));
                current = Some(sink);
            }
            Err(e) => warn!(kind = ?buffer.kind(), error = %e, "playback failed"),
        }
    }
}

fn source(buffer: &SampleBuffer) -> SamplesBuffer<f32> {
    SamplesBuffer::new(
        buffer.channels(),
        buffer.sample_rate(),
        buffer.samples().to_vec(),
    )
}

/// Desktop notifications via the platform's command-line notifier.
///
/// Uses `osascript` on macOS and `notify-send` elsewhere. The child process is
/// reaped on a detached thread so `notify` returns immediately.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    fn command(&self, title: &str, body: &str) -> Command {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("osascript");
            cmd.arg("-e").arg(format!(
                "display notification {} with title {}",
                applescript_quote(body),
                applescript_quote(title)
            ));
            cmd
        } else {
            let mut cmd = Command::new("notify-send");
            cmd.arg("--app-name").arg(&self.app_name).arg(title).arg(body);
            cmd
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("Focus")
    }
}

impl NotificationSink for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), AlertError> {
        let mut child = self
            .command(title, body)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AlertError::NotificationDenied(e.to_string()))?;

        let title = title.to_string();
        thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                warn!(%title, %status, "notifier exited with failure");
            }
            Err(e) => warn!(%title, error = %e, "notifier did not finish"),
            Ok(_) => {}
        });
        Ok(())
    }
}

fn applescript_quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{synthesize, AlertKind};
    use rodio::Source;
    use std::time::Duration;

    #[test]
    fn source_spans_the_whole_buffer() {
        for kind in AlertKind::ALL {
            let src = source(&synthesize(kind));
            assert_eq!(src.total_duration(), Some(Duration::from_secs(1)));
            assert_eq!(src.channels(), 1);
        }
    }

    #[test]
    fn applescript_strings_are_escaped() {
        assert_eq!(applescript_quote("Stay Focused!"), "\"Stay Focused!\"");
        assert_eq!(applescript_quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(applescript_quote(r"a\b"), r#""a\\b""#);
    }

    #[test]
    fn notify_send_arguments() {
        if cfg!(target_os = "macos") {
            return;
        }
        let cmd = DesktopNotifier::default().command("Break Time", "Take a 20-minute break");
        assert_eq!(cmd.get_program(), "notify-send");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["--app-name", "Focus", "Break Time", "Take a 20-minute break"]);
    }
}
