//! Stage graph for one loaded track.
//!
//! - [`ProcessingGraph`]: nodes, edges, chain validation and block rendering
//! - [`ChainSchedule`]: the validated render order produced by `compile()`
//! - [`NodeKind`] / [`NodeRole`]: source, stage effect, master gain,
//!   destination, capture tap
//! - [`StereoSamples`]: whole-track stereo data

mod edge;
mod node;
mod processing;
mod schedule;
mod stereo_samples;

pub use edge::EdgeId;
pub use node::{NodeId, NodeKind, NodeRole, TapSink};
pub use processing::{GraphError, ProcessingGraph};
pub use schedule::ChainSchedule;
pub use stereo_samples::StereoSamples;
