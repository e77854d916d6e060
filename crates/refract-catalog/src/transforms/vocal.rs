//! Vocal transforms: voice characters and pitch-shifted playback.

use refract_core::{Lfo, NodeId, SharedParam};
use refract_effects::{
    Drive, DriveCurve, Ensemble, FeedbackDelay, Filter, ModulatedDelay, NoiseLayer, RingMod,
    VocalRemover,
};

use super::{lfo_sweep, stage};
use crate::catalog::TransformDescriptor;
use crate::context::StageContext;
use crate::error::StageError;
use crate::id::{Category, TransformId, TransformKind};

pub(super) fn descriptors() -> Vec<TransformDescriptor> {
    let c = Category::Vocal;
    vec![
        TransformDescriptor::new(
            TransformId::builtin(11),
            "Chipmunk",
            c,
            "High-pitched fast playback",
            TransformKind::RateOnly,
            chipmunk,
        ),
        TransformDescriptor::new(
            TransformId::builtin(12),
            "Deep Voice",
            c,
            "Low-pitched slow playback",
            TransformKind::RateOnly,
            deep_voice,
        ),
        stage(13, "Robot", c, "60 Hz ring modulation into a metallic comb", robot),
        stage(14, "Telephone", c, "300 Hz to 3.4 kHz band with grit", telephone),
        stage(15, "Megaphone", c, "Narrow band into hard clipping", megaphone),
        stage(16, "Vocal Remover", c, "Cancels center-panned content", vocal_remover),
        stage(17, "Whisper", c, "Breathy noise that follows the voice", whisper),
        stage(18, "Radio", c, "Band-limited broadcast with hiss", radio),
        stage(19, "Vibrato", c, "Pitch wobble from a swept delay", vibrato),
        stage(20, "Choir", c, "Three detuned voices", choir),
    ]
}

fn chipmunk(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.request_rate(1.5);
    Ok(upstream)
}

fn deep_voice(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.request_rate(0.75);
    Ok(upstream)
}

fn robot(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let ring = ctx.insert(upstream, RingMod::new(60.0, 1.0))?;
    ctx.insert(ring, FeedbackDelay::new(6.0, 0.5, 0.5))
}

fn telephone(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let low_cut = ctx.insert(upstream, Filter::high_pass(300.0))?;
    let high_cut = ctx.insert(low_cut, Filter::low_pass(3400.0))?;
    ctx.insert(high_cut, Drive::new(DriveCurve::Soft, 6.0, -3.0))
}

fn megaphone(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let band = ctx.insert(upstream, Filter::band_pass(1500.0, 1.2))?;
    ctx.insert(
        band,
        Drive::new(DriveCurve::Hard, 12.0, -3.0).with_threshold(0.5),
    )
}

fn vocal_remover(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, VocalRemover)
}

fn whisper(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let airy = ctx.insert(upstream, Filter::high_pass(500.0))?;
    ctx.insert(airy, NoiseLayer::shaped(1.5, 0.15))
}

fn radio(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let band = ctx.insert(upstream, Filter::band_pass(1500.0, 0.7))?;
    ctx.insert(band, NoiseLayer::hiss(0.01))
}

fn vibrato(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    let offset = SharedParam::new(0.0);
    let node = ctx.insert(upstream, ModulatedDelay::new(5.0, 3.0, offset.clone()))?;
    ctx.spawn_task(lfo_sweep(offset, Lfo::new(5.5), 0.0, 2.0));
    Ok(node)
}

fn choir(ctx: &mut StageContext<'_>, upstream: NodeId) -> Result<NodeId, StageError> {
    ctx.insert(upstream, Ensemble::new(3, 4.0, 0.5))
}
