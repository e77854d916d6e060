//! Low Frequency Oscillator for modulation effects.
//!
//! Drives the in-node modulation of tremolo, auto pan and phaser, and the
//! periodic modulation tasks that sweep shared parameters.

use core::f32::consts::TAU;

/// LFO waveform type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Smooth sinusoid.
    #[default]
    Sine,
    /// Linear up/down ramps.
    Triangle,
    /// Rising ramp with abrupt reset.
    Saw,
    /// Binary on/off.
    Square,
}

/// Phase-accumulating oscillator producing values in [-1.0, 1.0].
///
/// The oscillator advances by a caller-supplied time step, so the same type
/// works per-sample inside an effect (`step = 1 / sample_rate`) and per-tick
/// inside a modulation task (`step = tick interval`).
///
/// # Example
///
/// ```rust
/// use refract_core::{Lfo, LfoWaveform};
///
/// let mut lfo = Lfo::new(2.0).with_waveform(LfoWaveform::Triangle);
/// let value = lfo.advance(1.0 / 48000.0);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Phase position [0.0, 1.0)
    phase: f32,
    frequency: f32,
    waveform: LfoWaveform,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Lfo {
    /// Creates a sine LFO at `freq_hz`, phase 0.
    pub fn new(freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            frequency: freq_hz.max(0.0),
            waveform: LfoWaveform::Sine,
        }
    }

    /// Builder-style waveform selection.
    pub fn with_waveform(mut self, waveform: LfoWaveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Builder-style phase offset (0.0 - 1.0).
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.set_phase(phase);
        self
    }

    /// Set frequency in Hz
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
    }

    /// Get current frequency in Hz
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Sync phase to a specific value (0.0 - 1.0)
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase.rem_euclid(1.0);
    }

    /// Get current phase (0.0 - 1.0)
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase to 0
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Current value without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        let p = self.phase;
        match self.waveform {
            LfoWaveform::Sine => (p * TAU).sin(),
            LfoWaveform::Triangle => {
                if p < 0.5 {
                    4.0 * p - 1.0
                } else {
                    3.0 - 4.0 * p
                }
            }
            LfoWaveform::Saw => 2.0 * p - 1.0,
            LfoWaveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    /// Returns the current value, then advances by `dt` seconds.
    #[inline]
    pub fn advance(&mut self, dt: f32) -> f32 {
        let out = self.value();
        self.phase += self.frequency * dt;
        if self.phase >= 1.0 {
            self.phase = self.phase.fract();
        }
        out
    }

    /// Like [`advance`](Self::advance), mapped to [0.0, 1.0].
    #[inline]
    pub fn advance_unipolar(&mut self, dt: f32) -> f32 {
        (self.advance(dt) + 1.0) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_range_and_period() {
        let sr = 1000.0;
        let mut lfo = Lfo::new(10.0);
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..100 {
            let v = lfo.advance(1.0 / sr);
            min = min.min(v);
            max = max.max(v);
        }
        assert!(max > 0.99 && min < -0.99);
        // 100 samples at 10 Hz / 1 kHz = one full cycle
        assert!(lfo.phase() < 1e-3 || lfo.phase() > 0.999);
    }

    #[test]
    fn test_triangle_shape() {
        let lfo = Lfo::new(1.0).with_waveform(LfoWaveform::Triangle);
        assert_eq!(lfo.value(), -1.0);
        let lfo = lfo.with_phase(0.5);
        assert_eq!(lfo.value(), 1.0);
    }

    #[test]
    fn test_unipolar_range() {
        let mut lfo = Lfo::new(3.0).with_waveform(LfoWaveform::Square);
        for _ in 0..1000 {
            let v = lfo.advance_unipolar(0.001);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_phase_wraps() {
        let mut lfo = Lfo::new(1.0).with_phase(1.25);
        assert!((lfo.phase() - 0.25).abs() < 1e-6);
        lfo.advance(0.9);
        assert!(lfo.phase() < 1.0);
    }
}
