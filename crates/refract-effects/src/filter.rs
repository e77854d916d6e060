//! Stereo biquad filter stage.
//!
//! One [`Filter`] covers every static EQ transform (shelves, low/high/band
//! pass) and, with a [`SharedParam`] cutoff, the swept ones (Wah,
//! Underwater) whose center frequency is driven by a modulation task.

use refract_core::{Biquad, Effect, FilterShape, SharedParam, SmoothedParam};

/// Samples between coefficient redesigns while the cutoff is modulated.
const REDESIGN_INTERVAL: u32 = 32;

/// Stereo biquad with an optionally modulated cutoff.
///
/// # Example
///
/// ```rust
/// use refract_effects::Filter;
/// use refract_core::Effect;
///
/// let mut lowpass = Filter::low_pass(1000.0);
/// lowpass.set_sample_rate(48000.0);
/// let (l, r) = lowpass.process_stereo(0.5, -0.5);
/// assert!(l.abs() < 0.5 && r.abs() < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Filter {
    shape: FilterShape,
    frequency: f32,
    q: f32,
    sample_rate: f32,
    left: Biquad,
    right: Biquad,
    cutoff: Option<SharedParam>,
    smoothed_cutoff: SmoothedParam,
    countdown: u32,
}

impl Filter {
    /// Creates a filter of the given shape.
    pub fn new(shape: FilterShape, frequency: f32, q: f32) -> Self {
        let mut filter = Self {
            shape,
            frequency,
            q,
            sample_rate: 48000.0,
            left: Biquad::new(),
            right: Biquad::new(),
            cutoff: None,
            smoothed_cutoff: SmoothedParam::new(frequency, 48000.0, 20.0),
            countdown: 0,
        };
        filter.redesign(frequency);
        filter
    }

    /// Butterworth low-pass.
    pub fn low_pass(frequency: f32) -> Self {
        Self::new(FilterShape::LowPass, frequency, core::f32::consts::FRAC_1_SQRT_2)
    }

    /// Butterworth high-pass.
    pub fn high_pass(frequency: f32) -> Self {
        Self::new(FilterShape::HighPass, frequency, core::f32::consts::FRAC_1_SQRT_2)
    }

    /// Band-pass centered on `frequency`.
    pub fn band_pass(frequency: f32, q: f32) -> Self {
        Self::new(FilterShape::BandPass, frequency, q)
    }

    /// Reads the cutoff from `cutoff` instead of the fixed frequency.
    pub fn with_cutoff_control(mut self, cutoff: SharedParam) -> Self {
        self.smoothed_cutoff = SmoothedParam::new(cutoff.get(), self.sample_rate, 20.0);
        self.redesign(cutoff.get());
        self.cutoff = Some(cutoff);
        self
    }

    /// Fixed design frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Frequency the coefficients were last designed for.
    pub fn current_cutoff(&self) -> f32 {
        self.smoothed_cutoff.get()
    }

    fn redesign(&mut self, frequency: f32) {
        let coeffs = self.shape.design(frequency, self.q, self.sample_rate);
        self.left.set_coefficients(coeffs);
        self.right.set_coefficients(coeffs);
    }
}

impl Effect for Filter {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        if let Some(cutoff) = &self.cutoff {
            self.smoothed_cutoff.set_target(cutoff.get());
            let freq = self.smoothed_cutoff.advance();
            if self.countdown == 0 {
                self.redesign(freq);
                self.countdown = REDESIGN_INTERVAL;
            }
            self.countdown -= 1;
        }
        (self.left.process(left), self.right.process(right))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.smoothed_cutoff.set_sample_rate(sample_rate);
        let freq = match &self.cutoff {
            Some(cutoff) => cutoff.get(),
            None => self.frequency,
        };
        self.redesign(freq);
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.smoothed_cutoff.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;

    fn sine_peak(filter: &mut Filter, freq: f32) -> f32 {
        let sr = 48000.0;
        let mut peak = 0.0f32;
        for i in 0..9600 {
            let x = (TAU * freq * i as f32 / sr).sin();
            let (l, _) = filter.process_stereo(x, x);
            if i > 4800 {
                peak = peak.max(l.abs());
            }
        }
        peak
    }

    #[test]
    fn test_low_pass_attenuates_highs() {
        let mut filter = Filter::low_pass(1000.0);
        filter.set_sample_rate(48000.0);
        assert!(sine_peak(&mut filter, 8000.0) < 0.05);
        filter.reset();
        assert!(sine_peak(&mut filter, 100.0) > 0.95);
    }

    #[test]
    fn test_high_pass_attenuates_lows() {
        let mut filter = Filter::high_pass(1500.0);
        filter.set_sample_rate(48000.0);
        assert!(sine_peak(&mut filter, 100.0) < 0.02);
    }

    #[test]
    fn test_cutoff_follows_shared_param() {
        let cutoff = SharedParam::new(500.0);
        let mut filter = Filter::low_pass(500.0).with_cutoff_control(cutoff.clone());
        filter.set_sample_rate(48000.0);

        cutoff.set(4000.0);
        for _ in 0..9600 {
            filter.process_stereo(0.0, 0.0);
        }
        assert!((filter.current_cutoff() - 4000.0).abs() < 10.0);
        assert!(sine_peak(&mut filter, 2000.0) > 0.9);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut filter = Filter::low_pass(1000.0);
        filter.set_sample_rate(48000.0);
        for _ in 0..100 {
            let (_, r) = filter.process_stereo(1.0, 0.0);
            assert_eq!(r, 0.0);
        }
    }
}
