//! Experimental transforms, including the two composites.
//!
//! Chaos draws three other transforms at random and chains them through
//! their own constructors. The candidate pool is every catalog id except
//! Chaos itself, so it can never recurse into itself, and the pool is
//! shuffled with an unbiased Fisher-Yates shuffle before the first three
//! are taken. Dreamscape is a fixed three-processor chain.

use rand::seq::SliceRandom;
use refract_core::{Lfo, NodeId, SharedParam};
use refract_effects::{
    Decimator, Diffuser, Drive, DriveCurve, FeedbackDelay, Filter, Glitch, NoiseLayer, Phaser,
    ReverseDelay, RingMod,
};

use super::stage;
use crate::catalog::TransformDescriptor;
use crate::context::StageContext;
use crate::error::StageError;
use crate::id::{Category, TransformId, TransformKind};

/// Id of the Chaos composite.
pub const CHAOS: TransformId = TransformId::builtin(49);

/// How many transforms Chaos chains.
pub const CHAOS_PICKS: usize = 3;

pub(super) fn descriptors() -> Vec<TransformDescriptor> {
    let c = Category::Experimental;
    vec![
        stage(41, "Distortion", c, "Aggressive hard clipping", distortion),
        stage(42, "Bitcrusher", c, "6-bit quantization", bitcrusher),
        stage(43, "Reverse Echo", c, "250 ms slices played backwards", reverse_echo),
        stage(44, "Glitch", c, "Random stutter repeats", glitch),
        stage(45, "Phaser", c, "Four-stage allpass sweep", phaser),
        stage(46, "Ring Mod", c, "440 Hz ring modulation", ring_mod),
        stage(47, "Static", c, "White noise over the track", static_noise),
        stage(48, "Wah", c, "Sweeping band-pass", wah),
        TransformDescriptor::new(
            CHAOS,
            "Chaos",
            c,
            "Three random transforms in random order",
            TransformKind::Composite,
            chaos,
        ),
        TransformDescriptor::new(
            TransformId::builtin(50),
            "Dreamscape",
            c,
            "Diffused, softly saturated and echoing",
            TransformKind::Composite,
            dreamscape,
        ),
    ]
}

fn distortion(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(
        upstream,
        Drive::new(DriveCurve::Hard, 20.0, -8.0).with_threshold(0.6),
    )
}

fn bitcrusher(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Decimator::bits_only(6))
}

fn reverse_echo(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, ReverseDelay::new(250.0, 0.5))
}

fn glitch(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Glitch::new(60.0, 0.25, 4))
}

fn phaser(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Phaser::new(0.5, 0.6))
}

fn ring_mod(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, RingMod::new(440.0, 0.8))
}

fn static_noise(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, NoiseLayer::hiss(0.04))
}

fn wah(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let center = SharedParam::new(400.0);
    let node = ctx.insert(
        upstream,
        Filter::band_pass(400.0, 4.0).with_cutoff_control(center.clone()),
    )?;
    let mut lfo = Lfo::new(2.0);
    // Exponential sweep from 400 Hz to 2 kHz, stepped every 5 ms.
    ctx.spawn_task_every(0.005, move |dt: f32| {
        center.set(400.0 * 5.0f32.powf(lfo.advance_unipolar(dt)));
    });
    Ok(node)
}

/// Candidate pool for Chaos: every catalog id except Chaos, ascending.
pub fn chaos_pool(ctx: &StageContext<'_>) -> Vec<TransformId> {
    ctx.catalog().ids().filter(|&id| id != CHAOS).collect()
}

fn chaos(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let catalog = ctx.catalog();
    let mut pool = chaos_pool(ctx);
    pool.shuffle(ctx.rng());
    pool.truncate(CHAOS_PICKS);
    tracing::debug!("chaos_picks: {pool:?}");

    let mut current = upstream;
    for id in pool {
        ctx.record_sub_transform(id);
        current = catalog.get(id)?.construct(ctx, current)?;
    }
    Ok(current)
}

fn dreamscape(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let diffused = ctx.insert(upstream, Diffuser::new(0.7))?;
    let shaped = ctx.insert(diffused, Drive::new(DriveCurve::Soft, 3.0, -2.0))?;
    ctx.insert(shaped, FeedbackDelay::new(450.0, 0.55, 0.4))
}
