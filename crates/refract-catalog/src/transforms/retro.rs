//! Retro transforms: vintage media and tape.

use refract_core::{FilterShape, Lfo, NodeId, SharedParam};
use refract_effects::{
    Crackle, Decimator, Drive, DriveCurve, Filter, ModulatedDelay, Reverb, ReverbType, Tremolo,
};

use super::stage;
use crate::catalog::TransformDescriptor;
use crate::context::StageContext;
use crate::error::StageError;
use crate::id::Category;

pub(super) fn descriptors() -> Vec<TransformDescriptor> {
    let c = Category::Retro;
    vec![
        stage(31, "Lo-Fi", c, "8-bit grit with reduced sample rate", lofi),
        stage(32, "Vinyl", c, "Warm record with surface crackle", vinyl),
        stage(33, "Nightcore", c, "Sped up and brightened", nightcore),
        stage(34, "Vaporwave", c, "Slowed, dark and washed out", vaporwave),
        stage(35, "8-Bit", c, "Console-style 4-bit sound", eight_bit),
        stage(36, "Cassette", c, "Tape wow, flutter and saturation", cassette),
        stage(37, "AM Radio", c, "Narrow band with fading signal", am_radio),
        stage(38, "Gramophone", c, "500 Hz to 4 kHz horn with crackle", gramophone),
        stage(39, "Tape Saturation", c, "Warm tanh saturation", tape_saturation),
        stage(40, "Tremolo", c, "Pulsing volume", tremolo),
    ]
}

fn lofi(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let crushed = ctx.insert(upstream, Decimator::new(8, 4))?;
    ctx.insert(crushed, Filter::low_pass(3500.0))
}

fn vinyl(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let warm = ctx.insert(upstream, Filter::low_pass(5000.0))?;
    ctx.insert(warm, Crackle::new(6.0, 0.25))
}

fn nightcore(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.request_rate(1.25);
    ctx.insert(
        upstream,
        Filter::new(FilterShape::HighShelf(4.0), 4000.0, core::f32::consts::FRAC_1_SQRT_2),
    )
}

fn vaporwave(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.request_rate(0.85);
    let dark = ctx.insert(upstream, Filter::low_pass(3000.0))?;
    ctx.insert(dark, Reverb::new(ReverbType::Room, 0.3))
}

fn eight_bit(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Decimator::new(4, 8))
}

fn cassette(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let offset = SharedParam::new(0.0);
    let wobble = ctx.insert(upstream, ModulatedDelay::new(8.0, 2.0, offset.clone()))?;
    let node = ctx.insert(wobble, Drive::new(DriveCurve::Soft, 4.0, -2.0))?;
    let mut wow = Lfo::new(0.5);
    let mut flutter = Lfo::new(6.0);
    ctx.spawn_task(move |dt: f32| offset.set(wow.advance(dt) * 1.2 + flutter.advance(dt) * 0.2));
    Ok(node)
}

fn am_radio(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let band = ctx.insert(upstream, Filter::band_pass(1000.0, 2.0))?;
    ctx.insert(band, Tremolo::new(3.0, 0.3))
}

fn gramophone(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let low_cut = ctx.insert(upstream, Filter::high_pass(500.0))?;
    let horn = ctx.insert(low_cut, Filter::low_pass(4000.0))?;
    ctx.insert(horn, Crackle::new(12.0, 0.3))
}

fn tape_saturation(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Drive::new(DriveCurve::Soft, 9.0, -4.0))
}

fn tremolo(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Tremolo::new(5.0, 0.7))
}
