//! Refract Effects - stage processors for the transform catalog
//!
//! Every type here implements [`refract_core::Effect`] and is wrapped in a
//! graph node by a transform constructor:
//!
//! - [`Filter`] - Biquad filter, optionally with a modulated cutoff
//! - [`Drive`] - Soft or hard clipping with pre/post gain
//! - [`Compressor`] / [`Fade`] - Dynamics
//! - [`MonoSum`], [`VocalRemover`], [`Widener`], [`Panner`] - Stereo field
//! - [`FeedbackDelay`], [`ModulatedDelay`], [`Ensemble`] - Delay based
//! - [`Reverb`] / [`Diffuser`] - Freeverb network and allpass diffusion
//! - [`Tremolo`], [`RingMod`], [`Phaser`] - Modulation
//! - [`Decimator`], [`Crackle`], [`NoiseLayer`] - Lo-fi degradation
//! - [`ReverseDelay`], [`Glitch`] - Time slicing
//!
//! ## Example
//!
//! ```rust
//! use refract_core::{Effect, EffectExt};
//! use refract_effects::{Drive, DriveCurve, Filter};
//!
//! let mut megaphone = Filter::band_pass(1500.0, 1.2)
//!     .chain(Drive::new(DriveCurve::Hard, 12.0, -3.0));
//! megaphone.set_sample_rate(48000.0);
//! let (l, r) = megaphone.process_stereo(0.2, 0.2);
//! assert!(l.is_finite() && r.is_finite());
//! ```

pub mod delay;
pub mod drive;
pub mod dynamics;
pub mod filter;
pub mod lofi;
pub mod phaser;
pub mod reverb;
pub mod ring_mod;
pub mod stereo;
pub mod time;
pub mod tremolo;

pub use delay::{Ensemble, FeedbackDelay, ModulatedDelay};
pub use drive::{Drive, DriveCurve};
pub use dynamics::{Compressor, Fade};
pub use filter::Filter;
pub use lofi::{Crackle, Decimator, NoiseLayer};
pub use phaser::Phaser;
pub use reverb::{Diffuser, Reverb, ReverbType};
pub use ring_mod::RingMod;
pub use stereo::{MonoSum, Panner, VocalRemover, Widener};
pub use time::{Glitch, ReverseDelay};
pub use tremolo::Tremolo;
