//! Refract Engine - transform composition, playback and export
//!
//! The engine owns one [`EngineSession`] per loaded track. Toggling a
//! transform rebuilds the session's graph from scratch:
//!
//! 1. [`ActivationSet`] - which transforms are on, ascending id
//! 2. [`compose`] - pure description of the stages to build
//! 3. [`Compositor::apply`] - tear down, fold constructors, rewire, compile
//! 4. [`RateCoordinator`] - decide the playback rate from the fold's requests
//!
//! Exports run through the [`CapturePipeline`], a four-state machine fed by a
//! tap after the master gain and bounded by
//! [`EngineConfig::capture_timeout_secs`].
//!
//! # Example
//!
//! ```rust
//! use refract_core::StereoSamples;
//! use refract_engine::{Engine, EngineConfig, EngineError};
//! use refract_io::{MemorySink, SourceTrack};
//!
//! let mut engine = Engine::new(EngineConfig::default(), MemorySink::new())?;
//! let track = SourceTrack::new("song.wav", StereoSamples::from_mono(vec![0.0; 48000]), 48000);
//! engine.load(track)?;
//!
//! engine.toggle_transform(3)?; // Speed Up
//! assert_eq!(engine.playback_rate(), 1.3);
//!
//! // Engines start suspended until the host resumes them.
//! assert!(matches!(engine.toggle_play(), Err(EngineError::EngineSuspended)));
//! let mut left = [0.0; 128];
//! let mut right = [0.0; 128];
//! engine.render(&mut left, &mut right);
//! assert!(engine.toggle_play()?);
//! # Ok::<(), EngineError>(())
//! ```

pub mod activation;
pub mod capture;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod rate;
pub mod session;
pub mod transport;

pub use activation::ActivationSet;
pub use capture::{CapturePipeline, CaptureState, ExportOutcome, Termination, derive_filename};
pub use compositor::{
    ApplyReport, Compositor, GraphDescription, StageFailure, StageSpec, compose,
};
pub use config::EngineConfig;
pub use engine::{Engine, EngineState, TransformInfo};
pub use error::{ConfigError, EngineError, Result};
pub use events::{EVENT_CAPACITY, EngineEvent, EventBus};
pub use rate::RateCoordinator;
pub use session::EngineSession;
pub use transport::{Fill, Transport};

pub use refract_catalog::TransformId;
