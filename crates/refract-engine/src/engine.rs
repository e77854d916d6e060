//! The host-facing engine.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use refract_catalog::{Category, TransformCatalog, TransformId};
use refract_io::{ArtifactSink, SourceTrack, decode_wav};
use serde::Serialize;

use crate::capture::{ExportOutcome, derive_filename};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{EngineEvent, EventBus};
use crate::session::EngineSession;

/// Whether the engine may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Waiting for [`Engine::resume`]. Renders silence.
    Suspended,
    /// Resume requested; the next rendered block completes it.
    Resuming,
    /// Rendering.
    Running,
}

/// Catalog entry as shown to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformInfo {
    /// Transform id.
    pub id: TransformId,
    /// Display name.
    pub name: &'static str,
    /// Grouping.
    pub category: Category,
    /// One-line summary.
    pub description: &'static str,
}

/// The composition engine: one loaded track at a time, its transforms, its
/// playback and its exports.
///
/// ```rust
/// use refract_core::StereoSamples;
/// use refract_engine::{Engine, EngineConfig};
/// use refract_io::{MemorySink, SourceTrack};
///
/// let config = EngineConfig::default().with_start_suspended(false);
/// let exports = MemorySink::new();
/// let mut engine = Engine::new(config, exports.clone())?;
///
/// let tone: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
/// engine.load(SourceTrack::new("tone.wav", StereoSamples::from_mono(tone), 48000))?;
/// engine.toggle_transform(23)?; // Echo
///
/// let outcome = engine.export_offline()?;
/// assert_eq!(outcome.filename, "tone-echo.wav");
/// assert_eq!(exports.len(), 1);
/// # Ok::<(), refract_engine::EngineError>(())
/// ```
pub struct Engine {
    config: EngineConfig,
    catalog: Arc<TransformCatalog>,
    state: EngineState,
    session: Option<EngineSession>,
    sink: Box<dyn ArtifactSink>,
    events: EventBus,
}

impl Engine {
    /// Creates an engine over the built-in catalog.
    pub fn new(config: EngineConfig, sink: impl ArtifactSink + 'static) -> Result<Self> {
        Self::with_catalog(config, TransformCatalog::shared(), sink)
    }

    /// Creates an engine over a custom catalog.
    pub fn with_catalog(
        config: EngineConfig,
        catalog: Arc<TransformCatalog>,
        sink: impl ArtifactSink + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let state = if config.start_suspended {
            EngineState::Suspended
        } else {
            EngineState::Running
        };
        Ok(Self {
            config,
            catalog,
            state,
            session: None,
            sink: Box::new(sink),
            events: EventBus::new(),
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &TransformCatalog {
        &self.catalog
    }

    /// Current engine state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The loaded session, if any.
    pub fn session(&self) -> Option<&EngineSession> {
        self.session.as_ref()
    }

    /// Whether a track is loaded.
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Registers an event listener.
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        self.events.subscribe()
    }

    // --- Suspension ---

    /// Requests a resume. It completes on the next [`render`](Self::render).
    pub fn resume(&mut self) {
        if self.state == EngineState::Suspended {
            tracing::debug!("engine_resume_requested");
            self.state = EngineState::Resuming;
        }
    }

    /// Suspends rendering until the next resume.
    ///
    /// No blocks reach the capture while suspended, so an export that is
    /// still recording is cancelled. One that already stopped stays ready
    /// for [`poll`](Self::poll).
    pub fn suspend(&mut self) {
        if self.state == EngineState::Suspended {
            return;
        }
        self.state = EngineState::Suspended;
        let stopped = self
            .session
            .as_ref()
            .is_some_and(|s| s.capture().is_ready());
        if !stopped && self.cancel_export() {
            tracing::warn!("export_interrupted: engine suspended");
        }
    }

    fn require_running(&mut self) -> Result<()> {
        if self.state == EngineState::Running {
            return Ok(());
        }
        self.resume();
        Err(EngineError::EngineSuspended)
    }

    fn session_mut(&mut self) -> Result<&mut EngineSession> {
        self.session.as_mut().ok_or(EngineError::EngineNotReady)
    }

    // --- Session lifecycle ---

    /// Loads a track, closing any previous session first.
    pub fn load(&mut self, track: SourceTrack) -> Result<()> {
        self.dispose();
        let session = EngineSession::new(track, &self.config)?;
        let track = session.track();
        tracing::info!(
            "session_loaded: {} ({:.2}s at {} Hz)",
            track.name(),
            track.duration_secs(),
            track.sample_rate()
        );
        let event = EngineEvent::TrackLoaded {
            name: track.name().to_string(),
            duration_secs: track.duration_secs(),
        };
        self.session = Some(session);
        self.events.emit(event);
        Ok(())
    }

    /// Decodes WAV bytes and loads them.
    pub fn load_wav(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let track = decode_wav(name, bytes)?;
        self.load(track)
    }

    /// Closes the session: stages removed, tasks cancelled, any export
    /// cancelled. Does nothing without a session.
    pub fn dispose(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if session.close(&self.catalog) {
            self.events.emit(EngineEvent::ExportCancelled);
        }
        self.events.emit(EngineEvent::TrackUnloaded);
    }

    // --- Catalog and activation ---

    /// Every transform, ascending id.
    pub fn list_transforms(&self) -> Vec<TransformInfo> {
        self.catalog
            .list_all()
            .map(|d| TransformInfo {
                id: d.id,
                name: d.name,
                category: d.category,
                description: d.description,
            })
            .collect()
    }

    /// [`list_transforms`](Self::list_transforms) as JSON.
    pub fn catalog_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.list_transforms())
    }

    /// Active transform ids, ascending. Empty without a session.
    pub fn active_transform_ids(&self) -> Vec<TransformId> {
        self.session
            .as_ref()
            .map(|s| s.activation().ids())
            .unwrap_or_default()
    }

    /// Flips transform `raw` and rebuilds. Returns its new membership.
    ///
    /// A failing constructor does not fail the toggle: the fallback graph is
    /// installed and a [`EngineEvent::StageConstructionFailed`] is emitted.
    pub fn toggle_transform(&mut self, raw: u16) -> Result<bool> {
        let id = self
            .catalog
            .get_raw(raw)
            .map_err(|_| EngineError::UnknownTransformId(raw))?
            .id;
        let active = self.session_mut()?.toggle(id);
        match self.rebuild() {
            Ok(_) | Err(EngineError::StageConstructionFailed { .. }) => Ok(active),
            Err(err) => Err(err),
        }
    }

    /// Rebuilds the graph from the current activations and returns the
    /// resolved playback rate.
    pub fn rebuild(&mut self) -> Result<f32> {
        let catalog = Arc::clone(&self.catalog);
        let report = self.session_mut()?.rebuild(&catalog);
        let stages = report.built().to_vec();
        match report.into_result() {
            Ok(rate) => {
                self.events.emit(EngineEvent::GraphRebuilt { stages, rate });
                Ok(rate)
            }
            Err(err) => {
                if let EngineError::StageConstructionFailed { id, source } = &err {
                    self.events.emit(EngineEvent::StageConstructionFailed {
                        id: *id,
                        reason: source.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    // --- Transport ---

    /// Starts or pauses playback. Returns whether it is now playing.
    pub fn toggle_play(&mut self) -> Result<bool> {
        self.session_mut()?;
        self.require_running()?;
        let session = self.session_mut()?;
        let playing = !session.transport().is_playing();
        if playing {
            session.play();
            self.events.emit(EngineEvent::PlaybackStarted);
        } else {
            session.pause();
            self.events.emit(EngineEvent::PlaybackPaused);
        }
        Ok(playing)
    }

    /// Moves the playhead to `secs` (clamped to the track).
    pub fn seek(&mut self, secs: f64) -> Result<()> {
        let secs = self.session_mut()?.seek(secs);
        self.events.emit(EngineEvent::Position { secs });
        Ok(())
    }

    /// Playhead position in track seconds.
    pub fn position_secs(&self) -> f64 {
        self.session
            .as_ref()
            .map_or(0.0, |s| s.transport().position_secs())
    }

    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.session.as_ref().map_or(0.0, |s| s.track().duration_secs())
    }

    /// Whether the track is playing.
    pub fn is_playing(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.transport().is_playing())
    }

    /// Resolved playback rate of the current graph.
    pub fn playback_rate(&self) -> f32 {
        self.session.as_ref().map_or(1.0, |s| s.transport().rate())
    }

    /// Output volume.
    pub fn master_volume(&self) -> f32 {
        self.config.master_volume
    }

    /// Sets the output volume, clamped to `0.0..=4.0`. Kept across loads.
    pub fn set_master_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 4.0)
        } else {
            1.0
        };
        self.config.master_volume = volume;
        if let Some(session) = &mut self.session {
            session.set_master_gain(volume);
        }
    }

    // --- Rendering ---

    /// Renders one block into `left`/`right`. Returns the number of track
    /// frames consumed.
    ///
    /// Completes a pending resume. A suspended engine, or one without a
    /// track, renders silence.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) -> usize {
        match self.state {
            EngineState::Suspended => {
                left.fill(0.0);
                right.fill(0.0);
                return 0;
            }
            EngineState::Resuming => {
                self.state = EngineState::Running;
                tracing::info!("engine_resumed");
                self.events.emit(EngineEvent::Resumed);
            }
            EngineState::Running => {}
        }

        let Some(session) = self.session.as_mut() else {
            left.fill(0.0);
            right.fill(0.0);
            return 0;
        };
        let fill = session.render(left, right);
        if fill.ended {
            self.events.emit(EngineEvent::PlaybackEnded);
        }
        fill.frames
    }

    // --- Export ---

    /// Starts capturing the processed track from the beginning.
    ///
    /// Drive it with [`render`](Self::render) and collect the result with
    /// [`poll`](Self::poll).
    pub fn export_processed_audio(&mut self) -> Result<()> {
        self.session_mut()?;
        self.require_running()?;
        let session = self.session_mut()?;
        let names = session.description().names();
        let filename = derive_filename(session.track(), &names);
        session.start_export(filename.clone())?;
        self.events.emit(EngineEvent::ExportStarted { filename });
        self.events.emit(EngineEvent::PlaybackStarted);
        Ok(())
    }

    /// Finishes an export whose recording has stopped. Returns `None` while
    /// recording continues or when no export is running.
    pub fn poll(&mut self) -> Option<Result<ExportOutcome>> {
        let session = self.session.as_mut()?;
        let result = session.finish_export(self.sink.as_mut())?;
        match &result {
            Ok(outcome) => self.events.emit(EngineEvent::ExportFinished {
                filename: outcome.filename.clone(),
                frames: outcome.frames,
                termination: outcome.termination,
            }),
            Err(err) => self.events.emit(EngineEvent::ExportFailed {
                reason: err.to_string(),
            }),
        }
        self.events.emit(EngineEvent::PlaybackPaused);
        Some(result)
    }

    /// Abandons a running export. Returns true if one was running.
    pub fn cancel_export(&mut self) -> bool {
        let cancelled = self
            .session
            .as_mut()
            .is_some_and(EngineSession::cancel_export);
        if cancelled {
            self.events.emit(EngineEvent::ExportCancelled);
        }
        cancelled
    }

    /// Runs a whole export: starts it, renders blocks of
    /// [`EngineConfig::block_size`] until it stops, then delivers it.
    pub fn export_offline(&mut self) -> Result<ExportOutcome> {
        self.export_processed_audio()?;
        let block = self.config.block_size;
        let max_blocks = self.config.capture_limit_frames() / block + 2;
        let mut left = vec![0.0; block];
        let mut right = vec![0.0; block];
        for _ in 0..max_blocks {
            self.render(&mut left, &mut right);
            if let Some(result) = self.poll() {
                return result;
            }
        }
        self.cancel_export();
        Err(EngineError::CaptureFailed(
            "recording did not stop within the capture bound".to_string(),
        ))
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("subscribers", &self.events.subscriber_count())
            .finish_non_exhaustive()
    }
}
