//! Track and artifact I/O for refract.
//!
//! This crate provides:
//!
//! - **Decoding**: [`decode_wav`] / [`read_wav`] turn WAV bytes or files into a
//!   [`SourceTrack`]
//! - **Encoding**: [`encode_wav`] renders captured stereo audio to an
//!   in-memory WAV file
//! - **Delivery**: the [`ArtifactSink`] trait, with [`MemorySink`] and
//!   [`DirectorySink`] implementations
//!
//! ## Quick Start
//!
//! ```rust
//! use refract_core::StereoSamples;
//! use refract_io::{SourceTrack, decode_wav, encode_wav};
//!
//! let samples = StereoSamples::from_mono(vec![0.0, 0.25, -0.25, 0.0]);
//! let bytes = encode_wav(&samples, 48000, 16)?;
//!
//! let track = decode_wav("clip.wav", &bytes)?;
//! assert_eq!(track.frames(), 4);
//! assert_eq!(track.sample_rate(), 48000);
//! # Ok::<(), refract_io::Error>(())
//! ```

mod artifact;
mod track;
mod wav;

pub use artifact::{Artifact, ArtifactSink, DirectorySink, MemorySink};
pub use track::SourceTrack;
pub use wav::{WavSpec, decode_wav, encode_wav, read_wav};

/// Error types for track and artifact I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV decode or encode error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The artifact could not be delivered.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
