//! Lo-fi degradation stages.
//!
//! # Theory
//!
//! [`Decimator`] combines two independent degradations. Bit depth reduction
//! rounds each sample to one of `2^B` levels, adding broadband quantization
//! noise of roughly `1 / (12 · 2^(2B))` relative power. Sample rate
//! reduction holds each latched input for `N` output samples (zero-order
//! hold), folding high frequencies back into the audible band.
//!
//! [`Crackle`] and [`NoiseLayer`] add noise instead of removing detail:
//! sparse decaying clicks for record surfaces, and a continuous hiss that can
//! follow the input envelope so it breathes with the signal.

use refract_core::{EnvelopeFollower, Effect, Noise, flush_denormal, mono_sum, quantize};

/// Bit depth plus zero-order-hold sample rate reduction.
///
/// ```rust
/// use refract_effects::Decimator;
/// use refract_core::Effect;
///
/// let mut crusher = Decimator::new(4, 8);
/// let (first, _) = crusher.process_stereo(0.3, 0.3);
/// // Later samples in the hold window repeat the latched value.
/// let (held, _) = crusher.process_stereo(-0.9, -0.9);
/// assert_eq!(first, held);
/// ```
#[derive(Debug, Clone)]
pub struct Decimator {
    bits: u32,
    factor: u32,
    counter: u32,
    held_l: f32,
    held_r: f32,
}

impl Decimator {
    /// Creates a decimator with `bits` of resolution (1–24) that keeps one
    /// sample in every `factor`.
    pub fn new(bits: u32, factor: u32) -> Self {
        Self {
            bits: bits.clamp(1, 24),
            factor: factor.max(1),
            counter: 0,
            held_l: 0.0,
            held_r: 0.0,
        }
    }

    /// Quantization only, no rate reduction.
    pub fn bits_only(bits: u32) -> Self {
        Self::new(bits, 1)
    }

    /// Bit depth.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Hold length in samples.
    pub fn factor(&self) -> u32 {
        self.factor
    }
}

impl Effect for Decimator {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        if self.counter == 0 {
            self.held_l = quantize(left.clamp(-1.0, 1.0), self.bits);
            self.held_r = quantize(right.clamp(-1.0, 1.0), self.bits);
        }
        self.counter = (self.counter + 1) % self.factor;
        (self.held_l, self.held_r)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        self.counter = 0;
        self.held_l = 0.0;
        self.held_r = 0.0;
    }
}

/// Record-surface crackle: random decaying clicks over faint surface noise.
#[derive(Debug, Clone)]
pub struct Crackle {
    density: f32,
    level: f32,
    noise: Noise,
    click: f32,
    decay: f32,
    sample_rate: f32,
}

impl Crackle {
    /// `density` is the number of clicks per second, `level` their peak.
    pub fn new(density: f32, level: f32) -> Self {
        let mut crackle = Self {
            density: density.max(0.0),
            level: level.clamp(0.0, 1.0),
            noise: Noise::new(0x5EED_0032),
            click: 0.0,
            decay: 0.0,
            sample_rate: 48000.0,
        };
        crackle.set_sample_rate(48000.0);
        crackle
    }
}

impl Effect for Crackle {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        if self.noise.chance(self.density / self.sample_rate) {
            self.click = self.noise.next_bipolar() * self.level;
        }
        let surface = self.noise.next_bipolar() * self.level * 0.02;
        let out = self.click + surface;
        self.click = flush_denormal(self.click * self.decay);
        (left + out, right + out)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        // Clicks die away in about a millisecond.
        self.decay = (-1.0 / (0.001 * sample_rate)).exp();
    }

    fn reset(&mut self) {
        self.noise.reset();
        self.click = 0.0;
    }
}

/// Continuous white noise layered over the signal.
///
/// When shaped, the noise level follows the input envelope and the dry signal
/// is attenuated, leaving a breathy imprint of the source.
#[derive(Debug, Clone)]
pub struct NoiseLayer {
    level: f32,
    dry: f32,
    envelope: Option<EnvelopeFollower>,
    noise: Noise,
}

impl NoiseLayer {
    /// Constant hiss at `level` added to the untouched signal.
    pub fn hiss(level: f32) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            dry: 1.0,
            envelope: None,
            noise: Noise::new(0x0415_5000),
        }
    }

    /// Noise whose amplitude tracks the input, with the dry signal scaled by `dry`.
    pub fn shaped(level: f32, dry: f32) -> Self {
        Self {
            level: level.clamp(0.0, 2.0),
            dry: dry.clamp(0.0, 1.0),
            envelope: Some(EnvelopeFollower::new(2.0, 60.0)),
            noise: Noise::new(0x0415_5001),
        }
    }

    /// True when the noise follows the input envelope.
    pub fn is_shaped(&self) -> bool {
        self.envelope.is_some()
    }
}

impl Effect for NoiseLayer {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let amount = match &mut self.envelope {
            Some(env) => env.follow(mono_sum(left, right)) * self.level,
            None => self.level,
        };
        let n_l = self.noise.next_bipolar() * amount;
        let n_r = self.noise.next_bipolar() * amount;
        (left * self.dry + n_l, right * self.dry + n_r)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        if let Some(env) = &mut self.envelope {
            env.set_sample_rate(sample_rate);
        }
    }

    fn reset(&mut self) {
        self.noise.reset();
        if let Some(env) = &mut self.envelope {
            env.reset();
        }
    }
}
