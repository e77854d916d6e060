//! Everything that lives for exactly one loaded track.

use rand::SeedableRng;
use rand::rngs::StdRng;
use refract_catalog::{StageContext, TransformCatalog, TransformId};
use refract_core::{NodeId, NodeRole, ProcessingGraph, TaskScheduler};
use refract_io::{ArtifactSink, SourceTrack};

use crate::activation::ActivationSet;
use crate::capture::{CapturePipeline, ExportOutcome};
use crate::compositor::{ApplyReport, Compositor, GraphDescription, compose};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::transport::{Fill, Transport};

/// One loaded track with its graph, activations, tasks and export state.
///
/// Created by [`Engine::load`](crate::Engine::load) and closed by the next
/// load or by [`Engine::dispose`](crate::Engine::dispose).
#[derive(Debug)]
pub struct EngineSession {
    track: SourceTrack,
    graph: ProcessingGraph,
    tasks: TaskScheduler,
    rng: StdRng,
    activation: ActivationSet,
    description: GraphDescription,
    compositor: Compositor,
    capture: CapturePipeline,
    transport: Transport,
    master: NodeId,
}

impl EngineSession {
    /// Builds the fixed graph `Source → Master Gain → Destination` for `track`.
    pub fn new(track: SourceTrack, config: &EngineConfig) -> Result<Self> {
        let mut graph = ProcessingGraph::new(config.sample_rate as f32);
        let source = graph.add_source();
        let master = graph.add_master_gain(config.master_volume);
        let destination = graph.add_destination();
        graph.connect(master, destination)?;
        graph.connect(source, master)?;
        graph.compile()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let transport = Transport::new(track.sample_rate(), config.sample_rate);

        Ok(Self {
            track,
            graph,
            tasks: TaskScheduler::new(config.modulation_interval_secs()),
            rng,
            activation: ActivationSet::new(),
            description: GraphDescription::default(),
            compositor: Compositor::new(source, master),
            capture: CapturePipeline::new(
                config.sample_rate,
                config.capture_limit_frames(),
                config.export_bits_per_sample,
            ),
            transport,
            master,
        })
    }

    /// The loaded track.
    pub fn track(&self) -> &SourceTrack {
        &self.track
    }

    /// The processing graph.
    pub fn graph(&self) -> &ProcessingGraph {
        &self.graph
    }

    /// Active transforms.
    pub fn activation(&self) -> &ActivationSet {
        &self.activation
    }

    /// What the last rebuild was asked to build.
    pub fn description(&self) -> &GraphDescription {
        &self.description
    }

    /// The stages in the graph.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Export state.
    pub fn capture(&self) -> &CapturePipeline {
        &self.capture
    }

    /// Playback state.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Live modulation tasks.
    pub fn live_tasks(&self) -> usize {
        self.tasks.live_tasks()
    }

    /// Effect nodes in the graph.
    pub fn stage_node_count(&self) -> usize {
        self.graph.nodes_with_role(NodeRole::Effect).len()
    }

    pub(crate) fn toggle(&mut self, id: TransformId) -> bool {
        self.activation.toggle(id)
    }

    /// Rebuilds the graph from the activation set and applies the resolved rate.
    pub(crate) fn rebuild(&mut self, catalog: &TransformCatalog) -> ApplyReport {
        self.description = compose(&self.activation, catalog);
        let mut ctx = StageContext::new(&mut self.graph, &mut self.tasks, &mut self.rng, catalog);
        let report = self.compositor.apply(&self.description, &mut ctx);
        self.tasks.prune();
        self.transport.set_rate(report.rate());
        report
    }

    /// Renders one block: track, stages, master gain, then the capture tap.
    pub(crate) fn render(&mut self, left: &mut [f32], right: &mut [f32]) -> Fill {
        let fill = self.transport.fill(self.track.samples(), left, right);
        self.graph.process_block(left, right);
        self.tasks.advance(left.len() as f32 / self.graph.sample_rate());
        self.capture.collect(fill.ended.then_some(fill.frames));
        fill
    }

    pub(crate) fn play(&mut self) {
        self.transport.play();
    }

    pub(crate) fn pause(&mut self) {
        self.transport.pause();
    }

    /// Moves the playhead and returns the clamped position.
    pub(crate) fn seek(&mut self, secs: f64) -> f64 {
        self.transport.seek(secs, self.track.samples());
        self.transport.position_secs()
    }

    pub(crate) fn set_master_gain(&mut self, gain: f32) {
        self.graph.set_master_gain(gain);
    }

    /// Attaches the capture tap and plays from the start.
    pub(crate) fn start_export(&mut self, filename: String) -> Result<()> {
        self.capture.start(&mut self.graph, self.master, filename)?;
        self.graph.reset_effects();
        self.transport.seek(0.0, self.track.samples());
        self.transport.play();
        Ok(())
    }

    /// Finishes a stopped recording and pauses playback.
    pub(crate) fn finish_export(
        &mut self,
        sink: &mut dyn ArtifactSink,
    ) -> Option<Result<ExportOutcome>> {
        let result = self.capture.finalize(&mut self.graph, sink)?;
        self.transport.pause();
        Some(result)
    }

    pub(crate) fn cancel_export(&mut self) -> bool {
        self.capture.cancel(&mut self.graph)
    }

    /// Closes the session: cancels any export, removes every stage and
    /// cancels every task. Returns true if an export was cancelled.
    pub(crate) fn close(mut self, catalog: &TransformCatalog) -> bool {
        let cancelled = self.capture.cancel(&mut self.graph);
        let mut ctx = StageContext::new(&mut self.graph, &mut self.tasks, &mut self.rng, catalog);
        self.compositor.teardown(&mut ctx);
        self.tasks.cancel_all();
        self.tasks.prune();
        tracing::info!("session_closed: {}", self.track.name());
        cancelled
    }
}
