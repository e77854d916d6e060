//! The 50 built-in transforms, one module per category.
//!
//! Every constructor follows the same shape: insert zero or more effect
//! nodes after `upstream` through the [`StageContext`](crate::StageContext), optionally spawn
//! modulation tasks or request a playback rate, and return the last node.

mod basic;
mod experimental;
mod retro;
mod spatial;
mod vocal;

pub use experimental::{CHAOS, CHAOS_PICKS, chaos_pool};

use refract_core::{Lfo, SharedParam};

use crate::catalog::{ConstructFn, TransformDescriptor};
use crate::id::{Category, TransformId, TransformKind};

/// Every built-in descriptor in ascending id order.
pub(crate) fn builtin_descriptors() -> Vec<TransformDescriptor> {
    let mut all = Vec::with_capacity(50);
    all.extend(basic::descriptors());
    all.extend(vocal::descriptors());
    all.extend(spatial::descriptors());
    all.extend(retro::descriptors());
    all.extend(experimental::descriptors());
    all
}

fn stage(
    id: u16,
    name: &'static str,
    category: Category,
    description: &'static str,
    constructor: ConstructFn,
) -> TransformDescriptor {
    TransformDescriptor::new(
        TransformId::builtin(id),
        name,
        category,
        description,
        TransformKind::Stage,
        constructor,
    )
}

/// Modulation task that writes `center + lfo * depth` into `param` each tick.
fn lfo_sweep(param: SharedParam, mut lfo: Lfo, center: f32, depth: f32) -> impl FnMut(f32) + Send {
    move |dt: f32| param.set(center + lfo.advance(dt) * depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_contiguous_and_ordered() {
        let ids: Vec<u16> = builtin_descriptors().iter().map(|d| d.id.get()).collect();
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<&str> = builtin_descriptors().iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 50);
    }

    #[test]
    fn test_lfo_sweep_writes_param() {
        let param = SharedParam::new(0.0);
        let mut task = lfo_sweep(param.clone(), Lfo::new(1.0).with_phase(0.25), 10.0, 2.0);
        // Quarter phase: sine peak.
        task(0.01);
        assert!((param.get() - 12.0).abs() < 1e-4);
    }
}
