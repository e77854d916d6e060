//! Refract Core - DSP primitives and the stage graph
//!
//! This crate provides the building blocks every transform stage is made of,
//! plus the graph that chains those stages between a track source and the
//! speakers.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe stereo processing trait for stage nodes
//! - [`EffectExt`] / [`Chain`] - Series composition inside one node
//! - [`Gain`] - Fixed linear gain
//!
//! ## Stage Graph
//!
//! - [`ProcessingGraph`] - Source → stages → master gain → destination, with
//!   an optional capture tap
//! - [`ChainSchedule`] - Validated render order
//!
//! ## Modulation
//!
//! - [`TaskScheduler`] / [`TaskHandle`] - Cancellable periodic tasks that
//!   sweep parameters on a timer
//! - [`SharedParam`] - Lock-free `f32` cell between a task and an effect
//! - [`SmoothedParam`] - Zipper-free parameter smoothing
//! - [`Lfo`] - Low-frequency oscillator
//!
//! ## Filters & Delays
//!
//! - [`Biquad`] + [`FilterShape`] - RBJ cookbook second-order sections
//! - [`DelayLine`] - Circular delay with fractional reads
//! - [`EnvelopeFollower`] - Peak envelope detection
//! - [`Noise`] - Allocation-free LCG noise
//!
//! # Example
//!
//! ```rust
//! use refract_core::{Gain, ProcessingGraph};
//!
//! let mut graph = ProcessingGraph::new(48000.0);
//! let source = graph.add_source();
//! let master = graph.add_master_gain(1.0);
//! let speakers = graph.add_destination();
//! let boost = graph.add_effect(Box::new(Gain::new(2.0)));
//!
//! graph.connect(source, boost)?;
//! graph.connect(boost, master)?;
//! graph.connect(master, speakers)?;
//! graph.compile()?;
//!
//! let mut left = [0.25; 64];
//! let mut right = [0.25; 64];
//! graph.process_block(&mut left, &mut right);
//! assert_eq!(left[0], 0.5);
//! # Ok::<(), refract_core::GraphError>(())
//! ```

pub mod biquad;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod graph;
pub mod lfo;
pub mod math;
pub mod modulation;
pub mod noise;
pub mod param;

pub use biquad::{Biquad, Coefficients, FilterShape};
pub use delay::DelayLine;
pub use effect::{Chain, Effect, EffectExt, Gain};
pub use envelope::EnvelopeFollower;
pub use graph::{
    ChainSchedule, EdgeId, GraphError, NodeId, NodeKind, NodeRole, ProcessingGraph,
    StereoSamples, TapSink,
};
pub use lfo::{Lfo, LfoWaveform};
pub use math::{
    db_to_linear, equal_power_pan, flush_denormal, hard_clip, lerp, linear_to_db, mono_sum,
    ms_to_samples, quantize, soft_clip, wet_dry_mix,
};
pub use modulation::{ModulationTask, TaskHandle, TaskId, TaskScheduler};
pub use noise::Noise;
pub use param::{SharedParam, SmoothedParam};
