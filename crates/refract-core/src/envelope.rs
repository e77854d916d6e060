//! Peak envelope follower used by the compressor and noise-shaping stages.

/// Peak detector with separate attack and release time constants.
///
/// ```rust
/// use refract_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(5.0, 80.0);
/// env.set_sample_rate(48000.0);
/// let level = env.follow(0.5);
/// assert!(level > 0.0 && level < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    level: f32,
    attack_ms: f32,
    release_ms: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

impl EnvelopeFollower {
    /// Creates a follower at 48 kHz with the given times in milliseconds.
    pub fn new(attack_ms: f32, release_ms: f32) -> Self {
        let mut env = Self {
            level: 0.0,
            attack_ms: attack_ms.max(0.1),
            release_ms: release_ms.max(1.0),
            attack_coeff: 0.0,
            release_coeff: 0.0,
        };
        env.set_sample_rate(48000.0);
        env
    }

    /// Recomputes the smoothing coefficients for a new sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        // coeff = exp(-1 / (time_ms * sr / 1000))
        self.attack_coeff = (-1000.0 / (self.attack_ms * sample_rate)).exp();
        self.release_coeff = (-1000.0 / (self.release_ms * sample_rate)).exp();
    }

    /// Feeds one sample and returns the updated envelope level.
    #[inline]
    pub fn follow(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let coeff = if rectified > self.level {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.level = crate::math::flush_denormal(coeff * self.level + (1.0 - coeff) * rectified);
        self.level
    }

    /// Current level without feeding input.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Drops the level to zero.
    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}
