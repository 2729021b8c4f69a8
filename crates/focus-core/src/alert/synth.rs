//! Procedural alert tones.
//!
//! Every alert is one second of mono audio at 44.1 kHz, generated from a fixed
//! recipe per [`AlertKind`]. Output depends only on the kind and the sample
//! index, so two calls always produce bit-identical buffers.

use std::f64::consts::TAU;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub const SAMPLE_RATE: u32 = 44_100;
/// One second of audio.
pub const BUFFER_LEN: usize = SAMPLE_RATE as usize;
/// Length of the linear fade at each end of the buffer.
pub const FADE_LEN: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    WorkToBreak,
    BreakToWork,
    FocusReminder,
}

impl AlertKind {
    pub const ALL: [AlertKind; 3] = [
        AlertKind::WorkToBreak,
        AlertKind::BreakToWork,
        AlertKind::FocusReminder,
    ];

    /// Fundamental frequency in Hz.
    pub fn base_frequency(self) -> f64 {
        match self {
            AlertKind::WorkToBreak => 440.0,
            AlertKind::BreakToWork => 880.0,
            AlertKind::FocusReminder => 659.25,
        }
    }

    /// Peak amplitude applied after clamping.
    pub fn amplitude(self) -> f64 {
        match self {
            AlertKind::WorkToBreak | AlertKind::BreakToWork => 0.8,
            AlertKind::FocusReminder => 0.75,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            AlertKind::WorkToBreak => 0,
            AlertKind::BreakToWork => 1,
            AlertKind::FocusReminder => 2,
        }
    }
}

/// A synthesized alert. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    kind: AlertKind,
    samples: Arc<[f32]>,
}

impl SampleBuffer {
    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    pub fn channels(&self) -> u16 {
        1
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub fn synthesize(kind: AlertKind) -> SampleBuffer {
    let samples: Arc<[f32]> = (0..BUFFER_LEN).map(|n| sample(kind, n)).collect();
    SampleBuffer { kind, samples }
}

/// Sample `n` of the alert for `kind`.
pub fn sample(kind: AlertKind, n: usize) -> f32 {
    let t = n as f64 / f64::from(SAMPLE_RATE);
    let f = kind.base_frequency();

    let mixed = match kind {
        AlertKind::WorkToBreak => (TAU * f * t).sin() + 0.3 * (TAU * 2.0 * f * t).sin(),
        AlertKind::BreakToWork => {
            let tone = (TAU * f * t).sin() + 0.5 * (TAU * 1.5 * f * t).sin();
            tone * (0.8 + 0.2 * (TAU * 8.0 * t).sin())
        }
        AlertKind::FocusReminder => {
            let sweep = 0.1 * (TAU * 2.0 * t).sin();
            (TAU * f * (1.0 + sweep) * t).sin()
        }
    };

    let value = mixed.clamp(-1.0, 1.0) * kind.amplitude() * envelope(n);
    value as f32
}

/// Linear fade-in over the first `FADE_LEN` samples and fade-out over the last.
fn envelope(n: usize) -> f64 {
    let fade = FADE_LEN as f64;
    let rise = n as f64 / fade;
    let fall = (BUFFER_LEN - n.min(BUFFER_LEN)) as f64 / fade;
    rise.min(fall).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count()
    }

    #[test]
    fn buffers_are_one_second_long() {
        for kind in AlertKind::ALL {
            let buf = synthesize(kind);
            assert_eq!(buf.len(), 44_100);
            assert_eq!(buf.kind(), kind);
            assert_eq!(buf.sample_rate(), 44_100);
            assert_eq!(buf.channels(), 1);
        }
    }

    #[test]
    fn synthesis_is_bit_identical() {
        for kind in AlertKind::ALL {
            let a = synthesize(kind);
            let b = synthesize(kind);
            let same = a
                .samples()
                .iter()
                .zip(b.samples())
                .all(|(x, y)| x.to_bits() == y.to_bits());
            assert!(same, "{kind:?} differs between calls");
        }
    }

    #[test]
    fn samples_stay_within_amplitude() {
        for kind in AlertKind::ALL {
            let peak = synthesize(kind)
                .samples()
                .iter()
                .fold(0.0f32, |m, s| m.max(s.abs()));
            assert!(peak <= kind.amplitude() as f32 + f32::EPSILON, "{kind:?} peak {peak}");
            assert!(peak > 0.5, "{kind:?} is nearly silent");
        }
    }

    #[test]
    fn edges_fade_to_silence() {
        for kind in AlertKind::ALL {
            let buf = synthesize(kind);
            assert_eq!(buf.samples()[0], 0.0);
            assert!(buf.samples()[BUFFER_LEN - 1].abs() < 0.001);
        }
    }

    #[test]
    fn envelope_shape() {
        assert_eq!(envelope(0), 0.0);
        assert_eq!(envelope(500), 0.5);
        assert_eq!(envelope(FADE_LEN), 1.0);
        assert_eq!(envelope(BUFFER_LEN / 2), 1.0);
        assert_eq!(envelope(BUFFER_LEN - 500), 0.5);
        assert_eq!(envelope(BUFFER_LEN - 1), 0.001);
    }

    #[test]
    fn work_to_break_matches_recipe_mid_buffer() {
        let n = 20_000;
        let t = n as f64 / 44_100.0;
        let expected = ((TAU * 440.0 * t).sin() + 0.3 * (TAU * 880.0 * t).sin()).clamp(-1.0, 1.0) * 0.8;
        assert_eq!(sample(AlertKind::WorkToBreak, n), expected as f32);
    }

    #[test]
    fn work_to_break_crosses_zero_at_fundamental() {
        // sin(x) + 0.3 sin(2x) = sin(x)(1 + 0.6 cos(x)), so zeros are those of sin(x).
        let crossings = zero_crossings(synthesize(AlertKind::WorkToBreak).samples());
        assert!((876..=882).contains(&crossings), "got {crossings}");
    }

    #[test]
    fn break_to_work_pulses() {
        // The 8 Hz modulation lowers the local peak near its trough at t = 3/32 s.
        let buf = synthesize(AlertKind::BreakToWork);
        let window_peak = |center: usize| {
            buf.samples()[center - 200..center + 200]
                .iter()
                .fold(0.0f32, |m, s| m.max(s.abs()))
        };
        let crest = window_peak(44_100 / 32);
        let trough = window_peak(44_100 * 3 / 32);
        assert!(trough < crest, "crest {crest} trough {trough}");
    }

    #[test]
    fn kinds_sound_different() {
        let a = synthesize(AlertKind::WorkToBreak);
        let b = synthesize(AlertKind::BreakToWork);
        let c = synthesize(AlertKind::FocusReminder);
        assert_ne!(a.samples(), b.samples());
        assert_ne!(b.samples(), c.samples());
        assert_ne!(a.samples(), c.samples());
    }
}
