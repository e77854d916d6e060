//! Graph composition.
//!
//! A rebuild happens in two steps. [`compose`] turns the activation set into
//! a [`GraphDescription`], a pure ordered list of stages. [`Compositor::apply`]
//! then tears down the previous stages and folds the description into the
//! graph between the source and the master gain:
//!
//! ```text
//! Source ─► stage(id₁) ─► stage(id₂) ─► … ─► Master Gain ─► Destination
//! ```
//!
//! If any constructor fails, everything built in the rebuild is removed and
//! the source is wired straight to the master gain.

use refract_catalog::{StageContext, StageError, StageRecord, TransformCatalog, TransformId};
use refract_core::{GraphError, NodeId};
use serde::Serialize;

use crate::activation::ActivationSet;
use crate::error::EngineError;
use crate::rate::RateCoordinator;

/// One stage of a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSpec {
    /// Transform to build.
    pub id: TransformId,
    /// Its display name.
    pub name: &'static str,
}

/// Ordered stages to build, ascending by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphDescription {
    stages: Vec<StageSpec>,
}

impl GraphDescription {
    /// Stages in build order.
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Stage ids in build order.
    pub fn ids(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.stages.iter().map(|s| s.id)
    }

    /// Stage names in build order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name).collect()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when the graph is a straight source-to-master wire.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Describes the graph for `active`. Ids missing from `catalog` are skipped.
pub fn compose(active: &ActivationSet, catalog: &TransformCatalog) -> GraphDescription {
    let stages = active
        .iter()
        .filter_map(|id| catalog.get(id).ok())
        .map(|d| StageSpec {
            id: d.id,
            name: d.name,
        })
        .collect();
    GraphDescription { stages }
}

/// The transform whose constructor aborted a rebuild.
#[derive(Debug)]
pub struct StageFailure {
    /// Failing transform.
    pub id: TransformId,
    /// Its error.
    pub error: StageError,
}

/// Result of one [`Compositor::apply`].
#[derive(Debug)]
pub struct ApplyReport {
    built: Vec<TransformId>,
    rate: f32,
    failure: Option<StageFailure>,
}

impl ApplyReport {
    /// Transforms now in the graph, in chain order. Empty after a failure.
    pub fn built(&self) -> &[TransformId] {
        &self.built
    }

    /// Resolved playback rate.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// The failure that aborted the rebuild, if any.
    pub fn failure(&self) -> Option<&StageFailure> {
        self.failure.as_ref()
    }

    /// True when every stage was built.
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    /// The resolved rate, or the failure as an [`EngineError`].
    pub fn into_result(self) -> Result<f32, EngineError> {
        match self.failure {
            None => Ok(self.rate),
            Some(StageFailure { id, error }) => {
                Err(EngineError::StageConstructionFailed { id, source: error })
            }
        }
    }
}

/// Owns the stages between the source and the master gain.
#[derive(Debug)]
pub struct Compositor {
    source: NodeId,
    master: NodeId,
    stages: Vec<StageRecord>,
    rates: RateCoordinator,
}

impl Compositor {
    /// Creates a compositor for the chain from `source` to `master`.
    pub fn new(source: NodeId, master: NodeId) -> Self {
        Self {
            source,
            master,
            stages: Vec::new(),
            rates: RateCoordinator::default(),
        }
    }

    /// Replaces the rate coordinator.
    pub fn with_rates(mut self, rates: RateCoordinator) -> Self {
        self.rates = rates;
        self
    }

    /// The source node.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The master gain node.
    pub fn master(&self) -> NodeId {
        self.master
    }

    /// Records of the stages currently in the graph, in chain order.
    pub fn stages(&self) -> &[StageRecord] {
        &self.stages
    }

    /// Ids of the stages currently in the graph.
    pub fn stage_ids(&self) -> Vec<TransformId> {
        self.stages.iter().map(StageRecord::id).collect()
    }

    /// Removes every stage's nodes and cancels its tasks.
    pub fn teardown(&mut self, ctx: &mut StageContext<'_>) {
        for record in self.stages.drain(..) {
            ctx.teardown(record);
        }
    }

    /// Rebuilds the chain from `description` and resolves the playback rate.
    pub fn apply(
        &mut self,
        description: &GraphDescription,
        ctx: &mut StageContext<'_>,
    ) -> ApplyReport {
        self.teardown(ctx);
        ctx.take_rate_request();
        if let Err(err) = ctx.graph_mut().disconnect_outgoing(self.source) {
            tracing::warn!("source_disconnect_failed: {err}");
        }

        let mut current = self.source;
        for stage in description.stages() {
            match self.build_stage(stage.id, current, ctx) {
                Ok(tail) => current = tail,
                Err(error) => return self.abort(stage.id, error, ctx),
            }
        }

        if let Err(err) = join(ctx, current, self.master) {
            match description.stages().last() {
                Some(last) => return self.abort(last.id, err.into(), ctx),
                None => tracing::warn!("fallback_wiring_failed: {err}"),
            }
        }

        let rate = self.rates.resolve(description.ids(), ctx.take_rate_request());
        let built = self.stage_ids();
        tracing::info!(
            "graph_rebuilt: {} stages, {} tasks, rate {rate}",
            built.len(),
            ctx.live_tasks()
        );
        ApplyReport {
            built,
            rate,
            failure: None,
        }
    }

    fn build_stage(
        &mut self,
        id: TransformId,
        upstream: NodeId,
        ctx: &mut StageContext<'_>,
    ) -> Result<NodeId, StageError> {
        let descriptor = ctx.catalog().get(id)?;
        ctx.begin_stage(id);
        match descriptor.construct(ctx, upstream) {
            Ok(tail) => {
                if let Some(record) = ctx.finish_stage() {
                    self.stages.push(record);
                }
                Ok(tail)
            }
            Err(err) => {
                ctx.abandon_stage();
                Err(err)
            }
        }
    }

    fn abort(
        &mut self,
        id: TransformId,
        error: StageError,
        ctx: &mut StageContext<'_>,
    ) -> ApplyReport {
        tracing::warn!("stage_construction_failed: {id}: {error}");
        self.teardown(ctx);
        ctx.take_rate_request();
        let fallback = ctx
            .graph_mut()
            .disconnect_outgoing(self.source)
            .and_then(|_| join(ctx, self.source, self.master));
        if let Err(err) = fallback {
            tracing::warn!("fallback_wiring_failed: {err}");
        }
        ApplyReport {
            built: Vec::new(),
            rate: RateCoordinator::UNITY,
            failure: Some(StageFailure { id, error }),
        }
    }
}

fn join(ctx: &mut StageContext<'_>, from: NodeId, master: NodeId) -> Result<(), GraphError> {
    let graph = ctx.graph_mut();
    graph.connect(from, master)?;
    graph.compile()?;
    Ok(())
}
