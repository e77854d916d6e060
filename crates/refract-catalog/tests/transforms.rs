//! Builds every catalog transform into a real graph and renders through it.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use refract_catalog::{
    CHAOS, CHAOS_PICKS, StageContext, StageRecord, TransformCatalog, TransformId, TransformKind,
};
use refract_core::{NodeId, ProcessingGraph, TaskScheduler};

struct Rig {
    graph: ProcessingGraph,
    tasks: TaskScheduler,
    rng: StdRng,
    source: NodeId,
    master: NodeId,
}

impl Rig {
    fn new(seed: u64) -> Self {
        let mut graph = ProcessingGraph::new(48000.0);
        let source = graph.add_source();
        let master = graph.add_master_gain(1.0);
        let dest = graph.add_destination();
        graph.connect(master, dest).unwrap();
        Self {
            graph,
            tasks: TaskScheduler::new(0.01),
            rng: StdRng::seed_from_u64(seed),
            source,
            master,
        }
    }

    /// Builds one transform between source and master.
    fn build(&mut self, catalog: &TransformCatalog, id: TransformId) -> (StageRecord, Option<f32>) {
        let mut ctx = StageContext::new(&mut self.graph, &mut self.tasks, &mut self.rng, catalog);
        ctx.begin_stage(id);
        let tail = catalog.get(id).unwrap().construct(&mut ctx, self.source).unwrap();
        let record = ctx.finish_stage().unwrap();
        let rate = ctx.take_rate_request();
        drop(ctx);
        self.graph.connect(tail, self.master).unwrap();
        self.graph.compile().unwrap();
        (record, rate)
    }
}

fn id(raw: u16) -> TransformId {
    TransformId::new(raw).unwrap()
}

#[test]
fn every_transform_builds_and_renders() {
    let catalog = TransformCatalog::shared();
    for descriptor in catalog.list_all() {
        let mut rig = Rig::new(u64::from(descriptor.id.get()));
        let (record, _) = rig.build(&catalog, descriptor.id);

        match descriptor.kind {
            TransformKind::RateOnly => assert!(record.nodes().is_empty(), "{}", descriptor.name),
            TransformKind::Stage => assert!(!record.nodes().is_empty(), "{}", descriptor.name),
            // Chaos may draw only rate-only transforms.
            TransformKind::Composite => {}
        }

        let mut left: Vec<f32> = (0..512).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let mut right = left.clone();
        for _ in 0..20 {
            rig.graph.process_block(&mut left, &mut right);
            rig.tasks.advance(512.0 / 48000.0);
            assert!(
                left.iter().chain(&right).all(|s| s.is_finite()),
                "{} produced non-finite output",
                descriptor.name
            );
        }
    }
}

#[test]
fn modulated_transforms_own_their_tasks() {
    let catalog = TransformCatalog::shared();
    for descriptor in catalog.list_all() {
        if descriptor.id == CHAOS {
            continue;
        }
        let mut rig = Rig::new(3);
        let (record, _) = rig.build(&catalog, descriptor.id);
        let expected = usize::from([19, 21, 28, 29, 30, 36, 48].contains(&descriptor.id.get()));
        assert_eq!(record.tasks().len(), expected, "{}", descriptor.name);
        assert_eq!(rig.tasks.live_tasks(), expected);

        drop(record);
        rig.tasks.prune();
        assert_eq!(rig.tasks.live_tasks(), 0, "{} leaked a task", descriptor.name);
    }
}

#[test]
fn rate_requests() {
    let catalog = TransformCatalog::shared();
    let expected = [
        (3, 1.3),
        (4, 0.8),
        (11, 1.5),
        (12, 0.75),
        (33, 1.25),
        (34, 0.85),
    ];
    for (raw, rate) in expected {
        let mut rig = Rig::new(0);
        let (_, request) = rig.build(&catalog, id(raw));
        assert_eq!(request, Some(rate), "transform {raw}");
    }

    let mut rig = Rig::new(0);
    let (_, request) = rig.build(&catalog, id(1));
    assert_eq!(request, None);
}

#[test]
fn dreamscape_is_three_fixed_stages() {
    let catalog = TransformCatalog::shared();
    let mut rig = Rig::new(0);
    let (record, _) = rig.build(&catalog, id(50));
    assert_eq!(record.nodes().len(), 3);
    assert!(record.sub_transforms().is_empty());
    assert_eq!(rig.graph.schedule().unwrap().effects(), record.nodes());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Chaos never picks itself, picks distinct transforms, and chains
    /// exactly its picks' nodes.
    #[test]
    fn chaos_excludes_itself(seed in any::<u64>()) {
        let catalog = TransformCatalog::shared();
        let mut rig = Rig::new(seed);
        let (record, _) = rig.build(&catalog, CHAOS);

        let picks = record.sub_transforms();
        prop_assert_eq!(picks.len(), CHAOS_PICKS);
        prop_assert!(!picks.contains(&CHAOS));
        let mut unique = picks.to_vec();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), CHAOS_PICKS);

        let schedule = rig.graph.schedule().unwrap();
        prop_assert_eq!(schedule.effects(), record.nodes());
    }
}

#[test]
fn chaos_is_reproducible_per_seed_and_varies_across_seeds() {
    let catalog = TransformCatalog::shared();
    let picks = |seed| {
        let mut rig = Rig::new(seed);
        rig.build(&catalog, CHAOS).0.sub_transforms().to_vec()
    };
    assert_eq!(picks(42), picks(42));
    let distinct: std::collections::HashSet<Vec<TransformId>> = (0..20).map(picks).collect();
    assert!(distinct.len() > 10);
}
