//! Parameters shared between modulation tasks and stage effects.
//!
//! A modulation task runs on the control side of the render loop and writes
//! a target value; the effect reads it every sample. [`SharedParam`] is the
//! lock-free cell between the two and [`SmoothedParam`] removes the zipper
//! noise that stepwise task updates would otherwise produce.
//!
//! ```rust
//! use refract_core::{SharedParam, SmoothedParam};
//!
//! let cutoff = SharedParam::new(800.0);
//! let writer = cutoff.clone();
//!
//! let mut smoothed = SmoothedParam::new(cutoff.get(), 48000.0, 10.0);
//! writer.set(1200.0);
//! smoothed.set_target(cutoff.get());
//! let next = smoothed.advance();
//! assert!(next > 800.0 && next < 1200.0);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Atomic `f32` cell shared by clone.
///
/// Stored as raw bits in an [`AtomicU32`]; relaxed ordering is enough because
/// each cell is an independent value with no cross-field invariants.
#[derive(Debug, Clone)]
pub struct SharedParam {
    bits: Arc<AtomicU32>,
}

impl SharedParam {
    /// Creates a cell holding `value`.
    pub fn new(value: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    /// Reads the current value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Stores a new value.
    #[inline]
    pub fn set(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// One-pole smoothed value for zipper-free parameter changes.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    smoothing_ms: f32,
}

impl SmoothedParam {
    /// Creates a smoothed value starting (and settled) at `initial`.
    pub fn new(initial: f32, sample_rate: f32, smoothing_ms: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            smoothing_ms,
        };
        param.set_sample_rate(sample_rate);
        param
    }

    /// Recomputes the coefficient. A smoothing time of zero means instant.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.coeff = if self.smoothing_ms <= 0.0 {
            1.0
        } else {
            1.0 - (-1000.0 / (self.smoothing_ms * sample_rate)).exp()
        };
    }

    /// Sets the value to approach.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Advances one sample toward the target.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Jumps straight to the target.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }
}
