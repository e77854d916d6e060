//! Level-dependent stages: the feed-forward compressor and the fade-in.

use refract_core::{Effect, EnvelopeFollower, db_to_linear, linear_to_db};

/// Feed-forward peak compressor with stereo-linked detection.
///
/// # Parameters
///
/// - `threshold_db`: level above which gain reduction starts
/// - `ratio`: input dB over threshold per output dB (≥ 1)
/// - `makeup_db`: gain applied after reduction
///
/// # Example
///
/// ```rust
/// use refract_effects::Compressor;
/// use refract_core::Effect;
///
/// let mut comp = Compressor::new(-18.0, 4.0, 6.0);
/// comp.set_sample_rate(48000.0);
/// let (l, r) = comp.process_stereo(0.5, 0.5);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    makeup: f32,
    detector: EnvelopeFollower,
}

impl Compressor {
    /// Creates a compressor with 5 ms attack and 120 ms release.
    pub fn new(threshold_db: f32, ratio: f32, makeup_db: f32) -> Self {
        Self {
            threshold_db,
            ratio: ratio.max(1.0),
            makeup: db_to_linear(makeup_db),
            detector: EnvelopeFollower::new(5.0, 120.0),
        }
    }

    /// Gain reduction in dB for a detected level.
    pub fn gain_reduction_db(&self, level: f32) -> f32 {
        let over = linear_to_db(level) - self.threshold_db;
        if over <= 0.0 {
            0.0
        } else {
            over - over / self.ratio
        }
    }
}

impl Effect for Compressor {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let level = self.detector.follow(left.abs().max(right.abs()));
        let gain = db_to_linear(-self.gain_reduction_db(level)) * self.makeup;
        (left * gain, right * gain)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.detector.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.detector.reset();
    }
}

/// Linear fade from silence over a fixed duration, counted from the first
/// processed frame.
#[derive(Debug, Clone)]
pub struct Fade {
    duration_secs: f32,
    total: u64,
    elapsed: u64,
}

impl Fade {
    /// Creates a fade-in lasting `duration_secs`.
    pub fn fade_in(duration_secs: f32) -> Self {
        let mut fade = Self {
            duration_secs: duration_secs.max(0.0),
            total: 0,
            elapsed: 0,
        };
        fade.set_sample_rate(48000.0);
        fade
    }

    /// Current gain in [0, 1].
    pub fn gain(&self) -> f32 {
        if self.elapsed >= self.total {
            1.0
        } else {
            self.elapsed as f32 / self.total as f32
        }
    }
}

impl Effect for Fade {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let gain = self.gain();
        if self.elapsed < self.total {
            self.elapsed += 1;
        }
        (left * gain, right * gain)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.total = (self.duration_secs * sample_rate) as u64;
    }

    fn reset(&mut self) {
        self.elapsed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_untouched() {
        let comp = Compressor::new(-10.0, 4.0, 0.0);
        assert_eq!(comp.gain_reduction_db(0.1), 0.0);
    }

    #[test]
    fn test_ratio_math() {
        let comp = Compressor::new(-20.0, 4.0, 0.0);
        // 0 dBFS is 20 dB over; 4:1 leaves 5 dB, so 15 dB reduction
        assert!((comp.gain_reduction_db(1.0) - 15.0).abs() < 0.01);
    }

    #[test]
    fn test_loud_signal_reduced() {
        let mut comp = Compressor::new(-20.0, 8.0, 0.0);
        comp.set_sample_rate(48000.0);
        let mut out = 0.0;
        for _ in 0..4800 {
            out = comp.process_stereo(1.0, 1.0).0;
        }
        assert!(out < 0.3, "steady-state output {out}");
    }

    #[test]
    fn test_fade_in_ramp() {
        let mut fade = Fade::fade_in(1.0);
        fade.set_sample_rate(100.0);
        assert_eq!(fade.process_stereo(1.0, 1.0), (0.0, 0.0));
        for _ in 0..49 {
            fade.process_stereo(1.0, 1.0);
        }
        assert!((fade.gain() - 0.5).abs() < 1e-6);
        for _ in 0..100 {
            fade.process_stereo(1.0, 1.0);
        }
        assert_eq!(fade.process_stereo(0.5, -0.5), (0.5, -0.5));
        fade.reset();
        assert_eq!(fade.gain(), 0.0);
    }
}
