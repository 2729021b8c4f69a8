mod dispatcher;
mod output;
mod recording;
pub mod synth;

pub use dispatcher::{AlertDispatcher, AudioSink, NotificationSink, Silent};
pub use output::{DesktopNotifier, RodioSink};
pub use recording::RecordingSink;
pub use synth::{synthesize, AlertKind, SampleBuffer};
