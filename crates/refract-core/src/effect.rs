//! Core Effect trait and related types.
//!
//! The [`Effect`] trait is what every stage node in a [`ProcessingGraph`]
//! wraps. Processing is stereo-first: a loaded track is always rendered as a
//! left/right pair, and several transforms (panning, widening, vocal removal)
//! need both channels at once.
//!
//! ## Design Decisions
//!
//! - **Stereo frames**: [`Effect::process_stereo`] is the one required
//!   processing method. Dual-mono effects simply run the same state machine
//!   twice with per-channel state.
//!
//! - **Object-safe**: stage nodes are stored as `Box<dyn Effect + Send>`, so
//!   the trait has no generic methods.
//!
//! - **In-place blocks**: the render path hands each effect the same pair of
//!   buffers, so the block method mutates in place.
//!
//! [`ProcessingGraph`]: crate::graph::ProcessingGraph

/// Core trait for all stage effects.
///
/// # Example
///
/// ```rust
/// use refract_core::Effect;
///
/// struct Swap;
///
/// impl Effect for Swap {
///     fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
///         (right, left)
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut swap = Swap;
/// assert_eq!(swap.process_stereo(1.0, 0.0), (0.0, 1.0));
/// ```
pub trait Effect {
    /// Process one stereo frame.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32);

    /// Process a block of stereo frames in place.
    ///
    /// Default implementation calls [`process_stereo`](Self::process_stereo)
    /// for each frame.
    fn process_block_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(
            left.len(),
            right.len(),
            "Left and right buffers must have same length"
        );
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_stereo(*l, *r);
        }
    }

    /// Update the sample rate and recalculate rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (delay lines, filter history) without touching
    /// parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Most effects have none.
    fn latency_samples(&self) -> usize {
        0
    }
}

/// Extension trait for chaining effects inside a single stage node.
pub trait EffectExt: Effect + Sized {
    /// Chain this effect with another, creating a composite effect.
    ///
    /// The output of `self` feeds into the input of `next`.
    fn chain<E: Effect>(self, next: E) -> Chain<Self, E> {
        Chain {
            first: self,
            second: next,
        }
    }
}

impl<T: Effect> EffectExt for T {}

/// Two effects chained in series.
///
/// Created by [`EffectExt::chain`].
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A: Effect, B: Effect> Effect for Chain<A, B> {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (l, r) = self.first.process_stereo(left, right);
        self.second.process_stereo(l, r)
    }

    fn process_block_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.first.process_block_stereo(left, right);
        self.second.process_block_stereo(left, right);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.first.set_sample_rate(sample_rate);
        self.second.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }

    fn latency_samples(&self) -> usize {
        self.first.latency_samples() + self.second.latency_samples()
    }
}

impl<A, B> Chain<A, B> {
    /// Get a reference to the first effect in the chain.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Get a reference to the second effect in the chain.
    pub fn second(&self) -> &B {
        &self.second
    }
}

/// Passthrough effect that applies a fixed linear gain.
#[derive(Debug, Clone, Copy)]
pub struct Gain {
    factor: f32,
}

impl Gain {
    /// Creates a gain stage with the given linear factor.
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }

    /// Creates a gain stage from a decibel value.
    pub fn from_db(db: f32) -> Self {
        Self::new(crate::math::db_to_linear(db))
    }

    /// Returns the linear gain factor.
    pub fn factor(&self) -> f32 {
        self.factor
    }
}

impl Effect for Gain {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (left * self.factor, right * self.factor)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain() {
        let mut chain = Gain::new(2.0).chain(Gain::new(3.0));
        assert_eq!(chain.process_stereo(1.0, -1.0), (6.0, -6.0));
    }

    #[test]
    fn test_chain_block() {
        let mut chain = Gain::new(2.0).chain(Gain::new(0.5));
        let mut left = [1.0, 2.0, 3.0];
        let mut right = [-1.0, -2.0, -3.0];
        chain.process_block_stereo(&mut left, &mut right);
        assert_eq!(left, [1.0, 2.0, 3.0]);
        assert_eq!(right, [-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_chain_latency() {
        struct LatentEffect(usize);
        impl Effect for LatentEffect {
            fn process_stereo(&mut self, l: f32, r: f32) -> (f32, f32) {
                (l, r)
            }
            fn set_sample_rate(&mut self, _: f32) {}
            fn reset(&mut self) {}
            fn latency_samples(&self) -> usize {
                self.0
            }
        }

        let chain = LatentEffect(10).chain(LatentEffect(5));
        assert_eq!(chain.latency_samples(), 15);
    }

    #[test]
    fn test_gain_from_db() {
        let gain = Gain::from_db(6.0);
        assert!((gain.factor() - 1.995).abs() < 0.01);
    }
}
