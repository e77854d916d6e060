//! Tremolo: rhythmic amplitude modulation with a unipolar LFO.

use refract_core::{Effect, Lfo, LfoWaveform};

/// LFO-driven volume modulation.
///
/// Gain swings between `1 - depth` and `1`.
///
/// ```rust
/// use refract_effects::Tremolo;
/// use refract_core::Effect;
///
/// let mut tremolo = Tremolo::new(5.0, 0.7);
/// tremolo.set_sample_rate(44100.0);
/// let (l, _) = tremolo.process_stereo(0.5, 0.5);
/// assert!(l <= 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Tremolo {
    lfo: Lfo,
    depth: f32,
    dt: f32,
}

impl Tremolo {
    /// Creates a sine tremolo at `rate_hz` with `depth` in [0, 1].
    pub fn new(rate_hz: f32, depth: f32) -> Self {
        Self {
            lfo: Lfo::new(rate_hz),
            depth: depth.clamp(0.0, 1.0),
            dt: 1.0 / 48000.0,
        }
    }

    /// Switches the LFO waveform.
    pub fn with_waveform(mut self, waveform: LfoWaveform) -> Self {
        self.lfo = self.lfo.with_waveform(waveform);
        self
    }
}

impl Effect for Tremolo {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let gain = 1.0 - self.depth * self.lfo.advance_unipolar(self.dt);
        (left * gain, right * gain)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.dt = 1.0 / sample_rate;
    }

    fn reset(&mut self) {
        self.lfo.reset();
    }
}
