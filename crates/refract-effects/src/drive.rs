//! Waveshaping drive stage.
//!
//! Volume Boost, Tape Saturation, Distortion, Megaphone and the Dreamscape
//! shaping step all reduce to `out = shape(x * pre) * post`.

use refract_core::{Effect, db_to_linear, hard_clip, soft_clip};

/// Transfer curve applied after the pre-gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveCurve {
    /// tanh saturation.
    #[default]
    Soft,
    /// Clip at ±`threshold`.
    Hard,
}

/// Static waveshaper with input and output gain.
///
/// ```rust
/// use refract_effects::{Drive, DriveCurve};
/// use refract_core::Effect;
///
/// let mut fuzz = Drive::new(DriveCurve::Hard, 20.0, -6.0);
/// let (l, _) = fuzz.process_stereo(0.9, 0.9);
/// assert!(l <= 0.51);
/// ```
#[derive(Debug, Clone)]
pub struct Drive {
    curve: DriveCurve,
    pre: f32,
    post: f32,
    threshold: f32,
}

impl Drive {
    /// Creates a drive with pre- and post-gain in dB.
    pub fn new(curve: DriveCurve, pre_db: f32, post_db: f32) -> Self {
        Self {
            curve,
            pre: db_to_linear(pre_db),
            post: db_to_linear(post_db),
            threshold: 1.0,
        }
    }

    /// Overrides the hard-clip threshold (default 1.0).
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.max(1e-3);
        self
    }

    #[inline]
    fn shape(&self, x: f32) -> f32 {
        let driven = x * self.pre;
        let shaped = match self.curve {
            DriveCurve::Soft => soft_clip(driven),
            DriveCurve::Hard => hard_clip(driven, self.threshold),
        };
        shaped * self.post
    }
}

impl Effect for Drive {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.shape(left), self.shape(right))
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_drive_bounded() {
        let mut drive = Drive::new(DriveCurve::Soft, 24.0, 0.0);
        for i in -100..=100 {
            let x = i as f32 / 10.0;
            let (l, r) = drive.process_stereo(x, -x);
            assert!(l.abs() <= 1.0 && r.abs() <= 1.0);
        }
    }

    #[test]
    fn test_hard_threshold() {
        let mut drive = Drive::new(DriveCurve::Hard, 0.0, 0.0).with_threshold(0.3);
        assert_eq!(drive.process_stereo(0.5, -0.5), (0.3, -0.3));
        assert_eq!(drive.process_stereo(0.1, 0.0), (0.1, 0.0));
    }

    #[test]
    fn test_small_signal_volume_boost() {
        // +6 dB pre into tanh is close to linear for quiet input
        let mut drive = Drive::new(DriveCurve::Soft, 6.0, 0.0);
        let (l, _) = drive.process_stereo(0.01, 0.0);
        assert!((l - 0.01995).abs() < 1e-3);
    }
}
