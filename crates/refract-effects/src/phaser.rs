//! Phaser built from cascaded first-order allpass filters.
//!
//! Mixing the input with an allpass-shifted copy of itself carves notches
//! where the phase difference reaches 180 degrees. An internal LFO sweeps
//! the allpass break frequency exponentially between `min_freq` and
//! `max_freq`, so the notches glide up and down the spectrum.

use core::f32::consts::PI;

use refract_core::{Effect, Lfo, flush_denormal, wet_dry_mix};

const STAGES: usize = 4;

/// Samples between allpass coefficient updates.
const COEFF_UPDATE_INTERVAL: u32 = 32;

#[derive(Debug, Clone, Copy, Default)]
struct FirstOrderAllpass {
    a: f32,
    x1: f32,
    y1: f32,
}

impl FirstOrderAllpass {
    fn set_frequency(&mut self, freq: f32, sample_rate: f32) {
        let t = (PI * freq / sample_rate).tan();
        self.a = (t - 1.0) / (t + 1.0);
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.a * input + self.x1 - self.a * self.y1;
        self.x1 = input;
        self.y1 = flush_denormal(output);
        output
    }

    fn clear(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// Four-stage stereo phaser.
///
/// The right channel's LFO runs a quarter cycle ahead of the left.
///
/// ```rust
/// use refract_effects::Phaser;
/// use refract_core::Effect;
///
/// let mut phaser = Phaser::new(0.5, 0.5);
/// phaser.set_sample_rate(48000.0);
/// let (l, r) = phaser.process_stereo(0.3, 0.3);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Phaser {
    left: [FirstOrderAllpass; STAGES],
    right: [FirstOrderAllpass; STAGES],
    lfo_l: Lfo,
    lfo_r: Lfo,
    feedback: f32,
    mix: f32,
    min_freq: f32,
    max_freq: f32,
    fb_l: f32,
    fb_r: f32,
    countdown: u32,
    sample_rate: f32,
}

impl Phaser {
    /// Creates a phaser sweeping at `rate_hz` with the given feedback.
    pub fn new(rate_hz: f32, feedback: f32) -> Self {
        Self {
            left: [FirstOrderAllpass::default(); STAGES],
            right: [FirstOrderAllpass::default(); STAGES],
            lfo_l: Lfo::new(rate_hz),
            lfo_r: Lfo::new(rate_hz).with_phase(0.25),
            feedback: feedback.clamp(0.0, 0.9),
            mix: 0.5,
            min_freq: 200.0,
            max_freq: 4000.0,
            fb_l: 0.0,
            fb_r: 0.0,
            countdown: 0,
            sample_rate: 48000.0,
        }
    }

    /// Sets the sweep range in Hz.
    pub fn with_range(mut self, min_freq: f32, max_freq: f32) -> Self {
        self.min_freq = min_freq.max(20.0);
        self.max_freq = max_freq.max(self.min_freq + 1.0);
        self
    }

    fn sweep_frequency(&self, lfo: f32) -> f32 {
        self.min_freq * (self.max_freq / self.min_freq).powf(lfo)
    }

    fn update_coefficients(&mut self, lfo_l: f32, lfo_r: f32) {
        let freq_l = self.sweep_frequency(lfo_l);
        let freq_r = self.sweep_frequency(lfo_r);
        for (i, (l, r)) in self.left.iter_mut().zip(&mut self.right).enumerate() {
            // Spread the stages slightly for a richer notch pattern.
            let offset = 1.0 + i as f32 * 0.1;
            l.set_frequency(freq_l * offset, self.sample_rate);
            r.set_frequency(freq_r * offset, self.sample_rate);
        }
    }
}

impl Effect for Phaser {
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let dt = 1.0 / self.sample_rate;
        let lfo_l = self.lfo_l.advance_unipolar(dt);
        let lfo_r = self.lfo_r.advance_unipolar(dt);
        if self.countdown == 0 {
            self.countdown = COEFF_UPDATE_INTERVAL;
            self.update_coefficients(lfo_l, lfo_r);
        }
        self.countdown -= 1;

        let mut wet_l = left + self.fb_l * self.feedback;
        let mut wet_r = right + self.fb_r * self.feedback;
        for ap in &mut self.left {
            wet_l = ap.process(wet_l);
        }
        for ap in &mut self.right {
            wet_r = ap.process(wet_r);
        }
        self.fb_l = flush_denormal(wet_l);
        self.fb_r = flush_denormal(wet_r);

        (
            wet_dry_mix(left, wet_l, self.mix),
            wet_dry_mix(right, wet_r, self.mix),
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.countdown = 0;
    }

    fn reset(&mut self) {
        self.left.iter_mut().for_each(FirstOrderAllpass::clear);
        self.right.iter_mut().for_each(FirstOrderAllpass::clear);
        self.fb_l = 0.0;
        self.fb_r = 0.0;
        self.lfo_l.reset();
        self.lfo_r.reset();
        self.lfo_r.set_phase(0.25);
        self.countdown = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allpass_unity_magnitude() {
        let mut ap = FirstOrderAllpass::default();
        ap.set_frequency(1000.0, 48000.0);
        let mut energy = 0.0;
        for i in 0..4800 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let y = ap.process(x);
            energy += y * y;
        }
        assert!((energy - 1.0).abs() < 1e-3, "energy {energy}");
    }

    #[test]
    fn test_sweep_range() {
        let phaser = Phaser::new(1.0, 0.0).with_range(100.0, 1600.0);
        assert!((phaser.sweep_frequency(0.0) - 100.0).abs() < 1e-3);
        assert!((phaser.sweep_frequency(0.5) - 400.0).abs() < 0.1);
        assert!((phaser.sweep_frequency(1.0) - 1600.0).abs() < 0.5);
    }

    #[test]
    fn test_sustained_input_stays_bounded() {
        let mut phaser = Phaser::new(2.0, 0.9);
        phaser.set_sample_rate(48000.0);
        for i in 0..96000 {
            let x = (i as f32 * 0.05).sin() * 0.8;
            let (l, r) = phaser.process_stereo(x, x);
            assert!(l.abs() < 10.0 && r.abs() < 10.0);
        }
    }
}
