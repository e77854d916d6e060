//! Export artifacts and where they go.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Error, Result};

/// A finished export: an encoded WAV file and the name to save it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name, e.g. `song-bass-boost.mp3`.
    pub filename: String,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
    /// Stereo frames captured.
    pub frames: usize,
    /// Sample rate of the capture.
    pub sample_rate: u32,
}

impl Artifact {
    /// MIME type of encoded exports.
    pub const WAV_MIME: &'static str = "audio/wav";

    /// Creates a WAV artifact.
    pub fn wav(filename: impl Into<String>, bytes: Vec<u8>, frames: usize, sample_rate: u32) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            mime_type: Self::WAV_MIME,
            frames,
            sample_rate,
        }
    }

    /// Captured length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate.max(1))
    }
}

/// Receives finished exports.
pub trait ArtifactSink: Send {
    /// Takes ownership of one artifact. Called once per successful export.
    fn deliver(&mut self, artifact: Artifact) -> Result<()>;
}

/// Keeps artifacts in memory. Clones share the same store, so a host can
/// hand one clone to the engine and read through another.
///
/// ```rust
/// use refract_io::{Artifact, ArtifactSink, MemorySink};
///
/// let store = MemorySink::new();
/// let mut sink = store.clone();
/// sink.deliver(Artifact::wav("a-original.wav", vec![1, 2, 3], 1, 48000))?;
/// assert_eq!(store.artifacts()[0].filename, "a-original.wav");
/// # Ok::<(), refract_io::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    store: Arc<Mutex<Vec<Artifact>>>,
}

impl MemorySink {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every delivered artifact, oldest first.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns every delivered artifact.
    pub fn take(&self) -> Vec<Artifact> {
        std::mem::take(&mut *self.store.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of delivered artifacts.
    pub fn len(&self) -> usize {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been delivered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactSink for MemorySink {
    fn deliver(&mut self, artifact: Artifact) -> Result<()> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(artifact);
        Ok(())
    }
}

/// Writes artifacts as files into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Targets `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&mut self, artifact: Artifact) -> Result<()> {
        let name = Path::new(&artifact.filename);
        if artifact.filename.is_empty() || name.file_name() != Some(name.as_os_str()) {
            return Err(Error::Delivery(format!(
                "refusing to write '{}' outside the target directory",
                artifact.filename
            )));
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, &artifact.bytes)?;
        tracing::info!("artifact_written: {}", path.display());
        self.written.push(path);
        Ok(())
    }
}
