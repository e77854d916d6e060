//! The construction API handed to transform constructors.
//!
//! A [`StageContext`] borrows everything a rebuild touches: the graph, the
//! task scheduler, the composite RNG and the catalog. Constructors only
//! mutate through it, so every node they insert and every task they spawn
//! is recorded on the [`StageRecord`] of the transform being built and can be
//! torn down as a unit.

use rand::rngs::StdRng;
use refract_core::{Effect, ModulationTask, NodeId, ProcessingGraph, TaskHandle, TaskScheduler};

use crate::catalog::TransformCatalog;
use crate::error::StageError;
use crate::id::TransformId;

/// Everything one active transform contributed to the graph.
///
/// Dropping a record cancels its tasks but leaves its nodes in the graph;
/// use [`StageContext::teardown`] to remove both.
#[derive(Debug)]
pub struct StageRecord {
    id: TransformId,
    nodes: Vec<NodeId>,
    tasks: Vec<TaskHandle>,
    sub_transforms: Vec<TransformId>,
}

impl StageRecord {
    fn new(id: TransformId) -> Self {
        Self {
            id,
            nodes: Vec::new(),
            tasks: Vec::new(),
            sub_transforms: Vec::new(),
        }
    }

    /// The transform that built this stage.
    pub fn id(&self) -> TransformId {
        self.id
    }

    /// Effect nodes in chain order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Handles of the modulation tasks the stage owns.
    pub fn tasks(&self) -> &[TaskHandle] {
        &self.tasks
    }

    /// Transforms a composite picked, in chain order.
    pub fn sub_transforms(&self) -> &[TransformId] {
        &self.sub_transforms
    }
}

/// Mutable view of a rebuild, passed to every constructor.
pub struct StageContext<'a> {
    graph: &'a mut ProcessingGraph,
    tasks: &'a mut TaskScheduler,
    rng: &'a mut StdRng,
    catalog: &'a TransformCatalog,
    rate_request: Option<f32>,
    current: Option<StageRecord>,
}

impl<'a> StageContext<'a> {
    /// Creates a context over the given rebuild targets.
    pub fn new(
        graph: &'a mut ProcessingGraph,
        tasks: &'a mut TaskScheduler,
        rng: &'a mut StdRng,
        catalog: &'a TransformCatalog,
    ) -> Self {
        Self {
            graph,
            tasks,
            rng,
            catalog,
            rate_request: None,
            current: None,
        }
    }

    /// The catalog this rebuild draws from.
    ///
    /// The reference outlives any borrow of the context, so a composite can
    /// look up a descriptor and pass the context into its constructor.
    pub fn catalog(&self) -> &'a TransformCatalog {
        self.catalog
    }

    /// Shared access to the graph.
    pub fn graph(&self) -> &ProcessingGraph {
        &*self.graph
    }

    /// Direct graph access for the code driving the rebuild. Nodes added
    /// this way are not recorded on any stage.
    pub fn graph_mut(&mut self) -> &mut ProcessingGraph {
        &mut *self.graph
    }

    /// Sample rate of the graph.
    pub fn sample_rate(&self) -> f32 {
        self.graph.sample_rate()
    }

    /// The random source used by composites.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    /// Number of live modulation tasks in the scheduler.
    pub fn live_tasks(&self) -> usize {
        self.tasks.live_tasks()
    }

    // --- Stage lifecycle ---

    /// Starts recording a stage for `id`. A stage left open is abandoned.
    pub fn begin_stage(&mut self, id: TransformId) {
        if self.current.is_some() {
            self.abandon_stage();
        }
        self.current = Some(StageRecord::new(id));
    }

    /// Closes the open stage and returns its record.
    pub fn finish_stage(&mut self) -> Option<StageRecord> {
        self.current.take()
    }

    /// Removes everything the open stage inserted so far.
    pub fn abandon_stage(&mut self) {
        if let Some(record) = self.current.take() {
            self.teardown(record);
        }
    }

    /// Removes a stage's nodes from the graph and cancels its tasks.
    pub fn teardown(&mut self, record: StageRecord) {
        for node in &record.nodes {
            // Already-removed nodes are fine; teardown is idempotent.
            let _ = self.graph.remove_node(*node);
        }
        tracing::debug!(
            "stage_teardown: {} ({} nodes, {} tasks)",
            record.id,
            record.nodes.len(),
            record.tasks.len()
        );
    }

    // --- Constructor operations ---

    /// Inserts `effect` after `upstream` and returns the new node.
    pub fn insert(
        &mut self,
        upstream: NodeId,
        effect: impl Effect + Send + 'static,
    ) -> Result<NodeId, StageError> {
        let node = self.graph.add_effect(Box::new(effect));
        if let Some(record) = &mut self.current {
            record.nodes.push(node);
        }
        if let Err(err) = self.graph.connect(upstream, node) {
            // Recorded nodes are removed by the abandon path; unrecorded
            // ones must not linger.
            if self.current.is_none() {
                let _ = self.graph.remove_node(node);
            }
            return Err(err.into());
        }
        Ok(node)
    }

    /// Spawns a task on the scheduler's default period, owned by the open stage.
    pub fn spawn_task(&mut self, task: impl ModulationTask + 'static) {
        let handle = self.tasks.spawn(task);
        self.own(handle);
    }

    /// Spawns a task that runs every `period_secs`, owned by the open stage.
    pub fn spawn_task_every(&mut self, period_secs: f32, task: impl ModulationTask + 'static) {
        let handle = self.tasks.spawn_every(period_secs, task);
        self.own(handle);
    }

    fn own(&mut self, handle: TaskHandle) {
        match &mut self.current {
            Some(record) => record.tasks.push(handle),
            // Without an open stage nothing owns the task.
            None => handle.cancel(),
        }
    }

    /// Requests a playback rate. The last request of a rebuild wins.
    pub fn request_rate(&mut self, rate: f32) {
        tracing::debug!("rate_request: {rate}");
        self.rate_request = Some(rate);
    }

    /// The most recent rate request of this rebuild.
    pub fn rate_request(&self) -> Option<f32> {
        self.rate_request
    }

    /// Clears the rate request, returning it.
    pub fn take_rate_request(&mut self) -> Option<f32> {
        self.rate_request.take()
    }

    /// Notes that the open composite stage chained transform `id`.
    pub fn record_sub_transform(&mut self, id: TransformId) {
        if let Some(record) = &mut self.current {
            record.sub_transforms.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use refract_core::{Gain, NodeRole};

    struct Fixture {
        graph: ProcessingGraph,
        tasks: TaskScheduler,
        rng: StdRng,
        source: NodeId,
    }

    fn fixture() -> Fixture {
        let mut graph = ProcessingGraph::new(48000.0);
        let source = graph.add_source();
        Fixture {
            graph,
            tasks: TaskScheduler::new(0.01),
            rng: StdRng::seed_from_u64(7),
            source,
        }
    }

    fn id(raw: u16) -> TransformId {
        TransformId::new(raw).unwrap()
    }

    #[test]
    fn test_insert_records_nodes_in_order() {
        let mut f = fixture();
        let catalog = TransformCatalog::empty();
        let mut ctx = StageContext::new(&mut f.graph, &mut f.tasks, &mut f.rng, &catalog);
        ctx.begin_stage(id(1));
        let a = ctx.insert(f.source, Gain::new(1.0)).unwrap();
        let b = ctx.insert(a, Gain::new(1.0)).unwrap();
        let record = ctx.finish_stage().unwrap();
        assert_eq!(record.nodes(), &[a, b]);
        assert_eq!(record.id(), id(1));
    }

    #[test]
    fn test_teardown_removes_nodes_and_tasks() {
        let mut f = fixture();
        let catalog = TransformCatalog::empty();
        let mut ctx = StageContext::new(&mut f.graph, &mut f.tasks, &mut f.rng, &catalog);
        ctx.begin_stage(id(2));
        let node = ctx.insert(f.source, Gain::new(1.0)).unwrap();
        ctx.spawn_task(|_dt: f32| {});
        assert_eq!(ctx.live_tasks(), 1);
        let record = ctx.finish_stage().unwrap();
        ctx.teardown(record);
        assert_eq!(ctx.live_tasks(), 0);
        assert!(!ctx.graph().contains(node));
        assert_eq!(ctx.graph().nodes_with_role(NodeRole::Effect).len(), 0);
    }

    #[test]
    fn test_abandon_discards_partial_stage() {
        let mut f = fixture();
        let catalog = TransformCatalog::empty();
        let mut ctx = StageContext::new(&mut f.graph, &mut f.tasks, &mut f.rng, &catalog);
        ctx.begin_stage(id(3));
        let node = ctx.insert(f.source, Gain::new(1.0)).unwrap();
        ctx.spawn_task(|_dt: f32| {});
        ctx.abandon_stage();
        assert!(ctx.finish_stage().is_none());
        assert!(!ctx.graph().contains(node));
        assert_eq!(ctx.live_tasks(), 0);
    }

    #[test]
    fn test_failed_insert_is_recorded_for_cleanup() {
        let mut f = fixture();
        let catalog = TransformCatalog::empty();
        let mut ctx = StageContext::new(&mut f.graph, &mut f.tasks, &mut f.rng, &catalog);
        ctx.begin_stage(id(4));
        let first = ctx.insert(f.source, Gain::new(1.0)).unwrap();
        // The source already has an output.
        assert!(ctx.insert(f.source, Gain::new(1.0)).is_err());
        ctx.abandon_stage();
        assert!(!ctx.graph().contains(first));
        assert_eq!(ctx.graph().node_count(), 1);
    }

    #[test]
    fn test_last_rate_request_wins() {
        let mut f = fixture();
        let catalog = TransformCatalog::empty();
        let mut ctx = StageContext::new(&mut f.graph, &mut f.tasks, &mut f.rng, &catalog);
        assert_eq!(ctx.rate_request(), None);
        ctx.request_rate(1.3);
        ctx.request_rate(0.8);
        assert_eq!(ctx.take_rate_request(), Some(0.8));
        assert_eq!(ctx.rate_request(), None);
    }

    #[test]
    fn test_task_without_stage_is_cancelled() {
        let mut f = fixture();
        let catalog = TransformCatalog::empty();
        let mut ctx = StageContext::new(&mut f.graph, &mut f.tasks, &mut f.rng, &catalog);
        ctx.spawn_task(|_dt: f32| {});
        assert_eq!(ctx.live_tasks(), 0);
    }
}
