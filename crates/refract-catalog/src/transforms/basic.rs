//! Basic transforms: EQ, gain, dynamics, speed and mono.

use refract_core::{FilterShape, NodeId};
use refract_effects::{Compressor, Drive, DriveCurve, Fade, Filter, MonoSum};

use super::stage;
use crate::catalog::TransformDescriptor;
use crate::context::StageContext;
use crate::error::StageError;
use crate::id::{Category, TransformId, TransformKind};

const Q_BUTTERWORTH: f32 = core::f32::consts::FRAC_1_SQRT_2;

pub(super) fn descriptors() -> Vec<TransformDescriptor> {
    let c = Category::Basic;
    vec![
        stage(1, "Bass Boost", c, "Low shelf +12 dB at 200 Hz", bass_boost),
        stage(2, "Treble Boost", c, "High shelf +10 dB at 3 kHz", treble_boost),
        rate_only(3, "Speed Up", "Plays 1.3x faster", speed_up),
        rate_only(4, "Slow Down", "Plays at 0.8x speed", slow_down),
        stage(5, "Volume Boost", c, "+6 dB with soft clipping", volume_boost),
        stage(6, "Low Pass", c, "Removes content above 1 kHz", low_pass),
        stage(7, "High Pass", c, "Removes content below 1.5 kHz", high_pass),
        stage(8, "Compressor", c, "Evens out loud and quiet parts", compressor),
        stage(9, "Fade In", c, "Rises from silence over 3 seconds", fade_in),
        stage(10, "Mono", c, "Folds left and right together", mono),
    ]
}

fn rate_only(
    id: u16,
    name: &'static str,
    description: &'static str,
    constructor: crate::catalog::ConstructFn,
) -> TransformDescriptor {
    TransformDescriptor::new(
        TransformId::builtin(id),
        name,
        Category::Basic,
        description,
        TransformKind::RateOnly,
        constructor,
    )
}

fn bass_boost(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(
        upstream,
        Filter::new(FilterShape::LowShelf(12.0), 200.0, Q_BUTTERWORTH),
    )
}

fn treble_boost(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(
        upstream,
        Filter::new(FilterShape::HighShelf(10.0), 3000.0, Q_BUTTERWORTH),
    )
}

fn speed_up(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.request_rate(1.3);
    Ok(upstream)
}

fn slow_down(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.request_rate(0.8);
    Ok(upstream)
}

fn volume_boost(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Drive::new(DriveCurve::Soft, 6.0, 0.0))
}

fn low_pass(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Filter::low_pass(1000.0))
}

fn high_pass(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Filter::high_pass(1500.0))
}

fn compressor(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Compressor::new(-20.0, 4.0, 6.0))
}

fn fade_in(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Fade::fade_in(3.0))
}

fn mono(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, MonoSum)
}
