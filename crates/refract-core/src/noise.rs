//! Allocation-free pseudo-random noise for hiss, crackle and stutter stages.
//!
//! A Numerical Recipes LCG (`a = 1664525`, `c = 1013904223`) is plenty for
//! audio-rate noise and keeps the render path free of heap state. Seeded
//! per stage so two noisy stages never produce correlated output.

/// Linear congruential noise source.
#[derive(Debug, Clone)]
pub struct Noise {
    seed: u32,
    state: u32,
}

impl Noise {
    /// Creates a generator with the given seed.
    pub fn new(seed: u32) -> Self {
        let seed = if seed == 0 { 0x1234_5678 } else { seed };
        Self { seed, state: seed }
    }

    /// Advances the generator and returns a value in [0.0, 1.0).
    #[inline]
    pub fn next_unipolar(&mut self) -> f32 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        // Upper bits have the longest period.
        f32::from(((self.state >> 8) & 0xFFFF) as u16) / 65536.0
    }

    /// Advances the generator and returns white noise in [-1.0, 1.0).
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        self.next_unipolar() * 2.0 - 1.0
    }

    /// Returns true with the given probability per call.
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_unipolar() < probability
    }

    /// Restores the initial seed.
    pub fn reset(&mut self) {
        self.state = self.seed;
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::new(0x1234_5678)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_and_mean() {
        let mut noise = Noise::new(7);
        let mut sum = 0.0f64;
        for _ in 0..100_000 {
            let v = noise.next_bipolar();
            assert!((-1.0..1.0).contains(&v));
            sum += f64::from(v);
        }
        assert!((sum / 100_000.0).abs() < 0.02);
    }

    #[test]
    fn test_reset_is_deterministic() {
        let mut noise = Noise::new(42);
        let first: Vec<f32> = (0..8).map(|_| noise.next_unipolar()).collect();
        noise.reset();
        let second: Vec<f32> = (0..8).map(|_| noise.next_unipolar()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_seed_is_replaced() {
        let mut a = Noise::new(0);
        let mut b = Noise::default();
        assert_eq!(a.next_unipolar(), b.next_unipolar());
    }
}
