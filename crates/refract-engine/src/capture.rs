//! The capture pipeline behind exports.
//!
//! # States
//!
//! ```text
//! Idle ─► Preparing ─► Recording ─► Finalizing ─► Idle
//!              │                         │
//!              └──────► Failed ◄─────────┘ (encode or delivery error)
//!                         │
//!                         └─► Idle
//! ```
//!
//! While recording, a tap node after the master gain forwards every rendered
//! block over a channel. Recording ends at the end of the track or when the
//! captured length reaches the configured bound, whichever comes first; both
//! lead to the same finalize step.

use crossbeam_channel::{Receiver, Sender, unbounded};
use refract_core::{NodeId, ProcessingGraph, StereoSamples, TapSink};
use refract_io::{Artifact, ArtifactSink, SourceTrack, encode_wav};
use serde::Serialize;

use crate::error::{EngineError, Result};

/// Where the capture pipeline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// No export running.
    Idle,
    /// Export accepted, tap not yet attached.
    Preparing,
    /// Rendered blocks are being captured.
    Recording,
    /// Chunks are being assembled and delivered.
    Finalizing,
    /// The last step failed; returns to Idle immediately.
    Failed,
}

/// Why a recording stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The track played to its end.
    EndOfTrack,
    /// The capture bound was reached first.
    Timeout,
}

/// A delivered export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportOutcome {
    /// File name the artifact was delivered under.
    pub filename: String,
    /// Captured stereo frames.
    pub frames: usize,
    /// Captured length in seconds.
    pub duration_secs: f64,
    /// Why recording stopped.
    pub termination: Termination,
    /// Encoded size.
    pub bytes: usize,
}

/// Derives the export file name from the track and the active stage names.
///
/// Names are lowercased with whitespace replaced by `-` and joined by `-`;
/// with no stages the suffix is `original`. The track's extension is kept.
///
/// ```rust
/// use refract_core::StereoSamples;
/// use refract_engine::derive_filename;
/// use refract_io::SourceTrack;
///
/// let track = SourceTrack::new("song.mp3", StereoSamples::default(), 48000);
/// assert_eq!(
///     derive_filename(&track, &["Bass Boost", "8D Audio"]),
///     "song-bass-boost-8d-audio.mp3"
/// );
/// assert_eq!(derive_filename(&track, &[]), "song-original.mp3");
/// ```
pub fn derive_filename(track: &SourceTrack, stage_names: &[&str]) -> String {
    let suffix = if stage_names.is_empty() {
        "original".to_string()
    } else {
        stage_names
            .iter()
            .map(|name| name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-"))
            .collect::<Vec<_>>()
            .join("-")
    };
    let extension = match track.extension() {
        "" => ".wav",
        ext => ext,
    };
    format!("{}-{suffix}{extension}", track.base_name())
}

/// Forwards each rendered block, interleaved, to the pipeline.
struct ChunkTap {
    tx: Sender<Vec<f32>>,
}

impl TapSink for ChunkTap {
    fn on_block(&mut self, left: &[f32], right: &[f32]) {
        let mut chunk = Vec::with_capacity(left.len() * 2);
        for (&l, &r) in left.iter().zip(right) {
            chunk.push(l);
            chunk.push(r);
        }
        // The pipeline drops the receiver when it detaches.
        let _ = self.tx.send(chunk);
    }
}

/// One export at a time: tap, chunk buffer, bound and delivery.
#[derive(Debug)]
pub struct CapturePipeline {
    state: CaptureState,
    chunks: Vec<Vec<f32>>,
    frames: usize,
    limit_frames: usize,
    filename: Option<String>,
    termination: Option<Termination>,
    tap: Option<NodeId>,
    rx: Option<Receiver<Vec<f32>>>,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl CapturePipeline {
    /// A pipeline capturing at `sample_rate`, at most `limit_frames` per export.
    pub fn new(sample_rate: u32, limit_frames: usize, bits_per_sample: u16) -> Self {
        Self {
            state: CaptureState::Idle,
            chunks: Vec::new(),
            frames: 0,
            limit_frames: limit_frames.max(1),
            filename: None,
            termination: None,
            tap: None,
            rx: None,
            sample_rate,
            bits_per_sample,
        }
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// True when no export is running.
    pub fn is_idle(&self) -> bool {
        self.state == CaptureState::Idle
    }

    /// Frames captured so far.
    pub fn captured_frames(&self) -> usize {
        self.frames
    }

    /// Chunks captured so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The bound on one export.
    pub fn limit_frames(&self) -> usize {
        self.limit_frames
    }

    /// Name of the export in progress.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Why recording stopped, once it has.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// The tap node, while recording.
    pub fn tap(&self) -> Option<NodeId> {
        self.tap
    }

    /// Accepts an export and attaches the tap after `master`.
    pub fn start(
        &mut self,
        graph: &mut ProcessingGraph,
        master: NodeId,
        filename: String,
    ) -> Result<()> {
        if self.state != CaptureState::Idle {
            return Err(EngineError::RecordingAlreadyInProgress);
        }
        self.state = CaptureState::Preparing;
        self.chunks.clear();
        self.frames = 0;
        self.termination = None;

        let (tx, rx) = unbounded();
        let tap = graph.add_tap(Box::new(ChunkTap { tx }));
        let attached = graph
            .connect(master, tap)
            .and_then(|_| graph.compile().map(|_| ()));
        if let Err(err) = attached {
            let _ = graph.remove_node(tap);
            self.fail();
            return Err(EngineError::CaptureFailed(format!(
                "could not attach capture tap: {err}"
            )));
        }

        tracing::info!("export_started: {filename}");
        self.tap = Some(tap);
        self.rx = Some(rx);
        self.filename = Some(filename);
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Collects the blocks rendered since the last call.
    ///
    /// `track_end` carries the number of valid frames in the last block when
    /// the track ended during it; the padding after them is not captured.
    pub fn collect(&mut self, track_end: Option<usize>) {
        if self.state != CaptureState::Recording || self.termination.is_some() {
            return;
        }
        let Some(rx) = &self.rx else {
            return;
        };
        let mut pending: Vec<Vec<f32>> = rx.try_iter().collect();
        if let (Some(valid), Some(last)) = (track_end, pending.last_mut()) {
            last.truncate(valid * 2);
        }

        for mut chunk in pending {
            let room = self.limit_frames - self.frames;
            if chunk.len() / 2 >= room {
                chunk.truncate(room * 2);
                self.push(chunk);
                self.termination = Some(Termination::Timeout);
                tracing::debug!("capture_bound_reached: {} frames", self.frames);
                return;
            }
            self.push(chunk);
        }
        if track_end.is_some() {
            self.termination = Some(Termination::EndOfTrack);
        }
    }

    fn push(&mut self, chunk: Vec<f32>) {
        if !chunk.is_empty() {
            self.frames += chunk.len() / 2;
            self.chunks.push(chunk);
        }
    }

    /// True once recording has stopped and [`finalize`](Self::finalize) is due.
    pub fn is_ready(&self) -> bool {
        self.state == CaptureState::Recording && self.termination.is_some()
    }

    /// Assembles, encodes and delivers the export, then returns to Idle.
    ///
    /// Returns `None` unless [`is_ready`](Self::is_ready). Errors are reported
    /// once; the pipeline is Idle afterwards either way.
    pub fn finalize(
        &mut self,
        graph: &mut ProcessingGraph,
        sink: &mut dyn ArtifactSink,
    ) -> Option<Result<ExportOutcome>> {
        let termination = self.termination.filter(|_| self.is_ready())?;
        self.state = CaptureState::Finalizing;
        self.detach(graph);

        let result = self.deliver(termination, sink);
        match &result {
            Ok(outcome) => tracing::info!(
                "export_finished: {} ({} frames, {:?})",
                outcome.filename,
                outcome.frames,
                termination
            ),
            Err(err) => {
                tracing::warn!("export_failed: {err}");
                self.state = CaptureState::Failed;
            }
        }
        self.clear();
        Some(result)
    }

    fn deliver(
        &mut self,
        termination: Termination,
        sink: &mut dyn ArtifactSink,
    ) -> Result<ExportOutcome> {
        let interleaved = self.chunks.concat();
        let samples = StereoSamples::from_interleaved(&interleaved);
        let bytes = encode_wav(&samples, self.sample_rate, self.bits_per_sample)
            .map_err(EngineError::capture)?;
        let filename = self.filename.clone().unwrap_or_default();
        let outcome = ExportOutcome {
            filename: filename.clone(),
            frames: samples.len(),
            duration_secs: samples.len() as f64 / f64::from(self.sample_rate.max(1)),
            termination,
            bytes: bytes.len(),
        };
        sink.deliver(Artifact::wav(filename, bytes, samples.len(), self.sample_rate))
            .map_err(EngineError::capture)?;
        Ok(outcome)
    }

    /// Abandons an export in progress. Returns true if one was running.
    pub fn cancel(&mut self, graph: &mut ProcessingGraph) -> bool {
        if self.is_idle() {
            return false;
        }
        tracing::warn!(
            "export_cancelled: {} after {} frames",
            self.filename.as_deref().unwrap_or(""),
            self.frames
        );
        self.detach(graph);
        self.clear();
        true
    }

    fn detach(&mut self, graph: &mut ProcessingGraph) {
        self.rx = None;
        if let Some(tap) = self.tap.take() {
            let _ = graph.remove_node(tap);
            if let Err(err) = graph.compile() {
                tracing::warn!("recompile_after_detach_failed: {err}");
            }
        }
    }

    fn fail(&mut self) {
        self.state = CaptureState::Failed;
        self.clear();
    }

    fn clear(&mut self) {
        self.chunks = Vec::new();
        self.frames = 0;
        self.filename = None;
        self.termination = None;
        self.state = CaptureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_io::MemorySink;

    struct Rig {
        graph: ProcessingGraph,
        master: NodeId,
        capture: CapturePipeline,
    }

    fn rig(limit_frames: usize) -> Rig {
        let mut graph = ProcessingGraph::new(48000.0);
        let source = graph.add_source();
        let master = graph.add_master_gain(1.0);
        let dest = graph.add_destination();
        graph.connect(master, dest).unwrap();
        graph.connect(source, master).unwrap();
        graph.compile().unwrap();
        Rig {
            graph,
            master,
            capture: CapturePipeline::new(48000, limit_frames, 32),
        }
    }

    fn render(rig: &mut Rig, value: f32, frames: usize) {
        let mut left = vec![value; frames];
        let mut right = vec![-value; frames];
        rig.graph.process_block(&mut left, &mut right);
    }

    fn track(name: &str) -> SourceTrack {
        SourceTrack::new(name, StereoSamples::default(), 48000)
    }

    #[test]
    fn test_filename_derivation() {
        let song = track("song.mp3");
        assert_eq!(
            derive_filename(&song, &["Bass Boost", "8D Audio"]),
            "song-bass-boost-8d-audio.mp3"
        );
        assert_eq!(derive_filename(&song, &[]), "song-original.mp3");
        assert_eq!(
            derive_filename(&track("my.take.flac"), &["Lo-Fi", "Tape  Saturation"]),
            "my.take-lo-fi-tape-saturation.flac"
        );
        assert_eq!(derive_filename(&track("demo"), &["Echo"]), "demo-echo.wav");
    }

    #[test]
    fn test_start_attaches_tap_and_rejects_second_export() {
        let mut rig = rig(1000);
        rig.capture
            .start(&mut rig.graph, rig.master, "a.wav".into())
            .unwrap();
        assert_eq!(rig.capture.state(), CaptureState::Recording);
        assert!(rig.graph.schedule().unwrap().tap().is_some());

        let err = rig
            .capture
            .start(&mut rig.graph, rig.master, "b.wav".into())
            .unwrap_err();
        assert!(matches!(err, EngineError::RecordingAlreadyInProgress));
        assert_eq!(rig.capture.filename(), Some("a.wav"));
    }

    #[test]
    fn test_chunks_arrive_in_order() {
        let mut rig = rig(10_000);
        rig.capture
            .start(&mut rig.graph, rig.master, "a.wav".into())
            .unwrap();
        for i in 0..3 {
            render(&mut rig, i as f32 * 0.1, 64);
            rig.capture.collect(None);
        }
        assert_eq!(rig.capture.chunk_count(), 3);
        assert_eq!(rig.capture.captured_frames(), 192);
        assert!(!rig.capture.is_ready());
    }

    #[test]
    fn test_bound_truncates_and_terminates() {
        let mut rig = rig(100);
        rig.capture
            .start(&mut rig.graph, rig.master, "a.wav".into())
            .unwrap();
        for _ in 0..5 {
            render(&mut rig, 0.5, 64);
            rig.capture.collect(None);
        }
        assert_eq!(rig.capture.captured_frames(), 100);
        assert_eq!(rig.capture.termination(), Some(Termination::Timeout));
    }

    #[test]
    fn test_end_of_track_trims_padding() {
        let mut rig = rig(10_000);
        rig.capture
            .start(&mut rig.graph, rig.master, "a.wav".into())
            .unwrap();
        render(&mut rig, 0.5, 64);
        rig.capture.collect(Some(10));
        assert_eq!(rig.capture.captured_frames(), 10);
        assert_eq!(rig.capture.termination(), Some(Termination::EndOfTrack));
    }

    #[test]
    fn test_finalize_delivers_and_detaches() {
        let mut rig = rig(10_000);
        let store = MemorySink::new();
        let mut sink = store.clone();
        rig.capture
            .start(&mut rig.graph, rig.master, "song-echo.mp3".into())
            .unwrap();
        assert!(rig.capture.finalize(&mut rig.graph, &mut sink).is_none());

        render(&mut rig, 0.25, 32);
        rig.capture.collect(Some(32));
        let outcome = rig
            .capture
            .finalize(&mut rig.graph, &mut sink)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.filename, "song-echo.mp3");
        assert_eq!(outcome.frames, 32);
        assert_eq!(outcome.termination, Termination::EndOfTrack);

        assert!(rig.capture.is_idle());
        assert!(rig.graph.schedule().unwrap().tap().is_none());
        let artifacts = store.artifacts();
        assert_eq!(artifacts.len(), 1);
        let decoded = refract_io::decode_wav("x.wav", &artifacts[0].bytes).unwrap();
        assert_eq!(decoded.samples().left[0], 0.25);
        assert_eq!(decoded.samples().right[0], -0.25);
    }

    #[test]
    fn test_cancel_drops_everything() {
        let mut rig = rig(10_000);
        rig.capture
            .start(&mut rig.graph, rig.master, "a.wav".into())
            .unwrap();
        render(&mut rig, 0.5, 64);
        rig.capture.collect(None);
        assert!(rig.capture.cancel(&mut rig.graph));
        assert!(rig.capture.is_idle());
        assert_eq!(rig.capture.captured_frames(), 0);
        assert!(rig.graph.schedule().unwrap().tap().is_none());
        assert!(!rig.capture.cancel(&mut rig.graph));
    }

    struct RefusingSink;

    impl ArtifactSink for RefusingSink {
        fn deliver(&mut self, _artifact: Artifact) -> refract_io::Result<()> {
            Err(refract_io::Error::Delivery("no space".into()))
        }
    }

    #[test]
    fn test_delivery_failure_reports_once_and_resets() {
        let mut rig = rig(10_000);
        rig.capture
            .start(&mut rig.graph, rig.master, "a.wav".into())
            .unwrap();
        render(&mut rig, 0.5, 16);
        rig.capture.collect(Some(16));
        let result = rig.capture.finalize(&mut rig.graph, &mut RefusingSink).unwrap();
        assert!(matches!(result, Err(EngineError::CaptureFailed(_))));
        assert!(rig.capture.is_idle());
        assert!(rig.capture.finalize(&mut rig.graph, &mut RefusingSink).is_none());
    }
}
