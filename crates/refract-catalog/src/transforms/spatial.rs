//! Spatial transforms: rooms, echoes, width and movement.

use refract_core::{Lfo, NodeId, SharedParam};
use refract_effects::{
    FeedbackDelay, Filter, ModulatedDelay, Panner, Reverb, ReverbType, Widener,
};

use super::{lfo_sweep, stage};
use crate::catalog::TransformDescriptor;
use crate::context::StageContext;
use crate::error::StageError;
use crate::id::Category;

pub(super) fn descriptors() -> Vec<TransformDescriptor> {
    let c = Category::Spatial;
    vec![
        stage(21, "8D Audio", c, "Sound circles around the listener", eight_d),
        stage(22, "Reverb", c, "Small room ambience", reverb),
        stage(23, "Echo", c, "300 ms repeating echo", echo),
        stage(24, "Hall", c, "Large concert hall", hall),
        stage(25, "Stereo Widener", c, "Exaggerates stereo width", widener),
        stage(26, "Ping Pong", c, "Echoes bounce left and right", ping_pong),
        stage(27, "Auto Pan", c, "Sweeps between speakers", auto_pan),
        stage(28, "Chorus", c, "Shimmering doubled sound", chorus),
        stage(29, "Flanger", c, "Jet-plane comb sweep", flanger),
        stage(30, "Underwater", c, "Muffled and wobbling", underwater),
    ]
}

fn eight_d(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let position = SharedParam::new(0.0);
    let pan = ctx.insert(upstream, Panner::controlled(position.clone()))?;
    let room = ctx.insert(pan, Reverb::new(ReverbType::Room, 0.2))?;
    // One full orbit every 8 seconds.
    ctx.spawn_task(lfo_sweep(position, Lfo::new(0.125), 0.0, 1.0));
    Ok(room)
}

fn reverb(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Reverb::new(ReverbType::Room, 0.35))
}

fn echo(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, FeedbackDelay::new(300.0, 0.4, 0.35))
}

fn hall(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Reverb::new(ReverbType::Hall, 0.45))
}

fn widener(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Widener::new(1.8))
}

fn ping_pong(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, FeedbackDelay::new(250.0, 0.5, 0.45).ping_pong())
}

fn auto_pan(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Panner::lfo(0.5, 1.0))
}

fn chorus(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let offset = SharedParam::new(0.0);
    let node = ctx.insert(
        upstream,
        ModulatedDelay::new(20.0, 5.0, offset.clone()).with_mix(0.5),
    )?;
    ctx.spawn_task(lfo_sweep(offset, Lfo::new(1.5), 0.0, 3.0));
    Ok(node)
}

fn flanger(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let offset = SharedParam::new(0.0);
    let node = ctx.insert(
        upstream,
        ModulatedDelay::new(2.5, 2.0, offset.clone())
            .with_feedback(0.6)
            .with_mix(0.5),
    )?;
    ctx.spawn_task(lfo_sweep(offset, Lfo::new(0.25), 0.0, 2.0));
    Ok(node)
}

fn underwater(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let cutoff = SharedParam::new(500.0);
    let node = ctx.insert(
        upstream,
        Filter::low_pass(500.0).with_cutoff_control(cutoff.clone()),
    )?;
    ctx.spawn_task(lfo_sweep(cutoff, Lfo::new(0.3), 500.0, 250.0));
    Ok(node)
}
