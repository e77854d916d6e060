//! Ring modulator.
//!
//! Multiplies the input by a bipolar sine carrier, producing sum and
//! difference sidebands (`f_in ± f_carrier`) while suppressing the input
//! frequency itself. At low carrier rates (tens of Hz) the result is the
//! classic robot voice; at a few hundred Hz it turns metallic.
//!
//! ```text
//! out = in × (1 - depth + depth × carrier)
//! ```

use core::f32::consts::TAU;

use refract_core::Effect;

/// Sine-carrier ring modulator.
///
/// ```rust
/// use refract_effects::RingMod;
/// use refract_core::Effect;
///
/// let mut robot = RingMod::new(60.0, 1.0);
/// robot.set_sample_rate(48000.0);
/// // Carrier starts at phase 0, so the first frame is silent.
/// assert_eq!(robot.process_stereo(0.5, 0.5), (0.0, 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct RingMod {
    frequency: f32,
    depth: f32,
    phase: f32,
    phase_inc: f32,
}

impl RingMod {
    /// Creates a ring modulator with carrier `frequency` Hz and `depth` in [0, 1].
    pub fn new(frequency: f32, depth: f32) -> Self {
        Self {
            frequency,
            depth: depth.clamp(0.0, 1.0),
            phase: 0.0,
            phase_inc: frequency / 48000.0,
        }
    }

    /// Carrier frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl Effect for RingMod {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let carrier = (self.phase * TAU).sin();
        self.phase = (self.phase + self.phase_inc).fract();
        let gain = 1.0 - self.depth + self.depth * carrier;
        (left * gain, right * gain)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.phase_inc = self.frequency / sample_rate;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_depth_is_bypass() {
        let mut ring = RingMod::new(440.0, 0.0);
        for _ in 0..100 {
            assert_eq!(ring.process_stereo(0.3, -0.3), (0.3, -0.3));
        }
    }

    #[test]
    fn test_suppresses_dc() {
        // DC input becomes the carrier: its mean over a full period is zero.
        let mut ring = RingMod::new(100.0, 1.0);
        ring.set_sample_rate(48000.0);
        let mean: f32 = (0..48000).map(|_| ring.process_stereo(1.0, 1.0).0).sum::<f32>() / 48000.0;
        assert!(mean.abs() < 1e-3, "mean {mean}");
    }
}
