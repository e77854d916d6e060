//! Refract Catalog - the transforms a user can toggle
//!
//! The catalog is a fixed, process-wide set of 50 [`TransformDescriptor`]s.
//! Each descriptor carries display metadata and a constructor that builds
//! its stage into a [`ProcessingGraph`](refract_core::ProcessingGraph)
//! through a [`StageContext`].
//!
//! # Features
//!
//! - **Discovery**: [`TransformCatalog::list_all`], [`TransformCatalog::by_category`]
//! - **Construction**: [`TransformDescriptor::construct`] inserts nodes,
//!   spawns modulation tasks and issues rate requests
//! - **Composites**: Chaos (49) chains three random others, Dreamscape (50)
//!   a fixed diffusion, saturation and echo chain
//! - **Extension**: [`TransformCatalog::builder`] registers custom descriptors
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use refract_catalog::{StageContext, TransformCatalog, TransformId};
//! use refract_core::{ProcessingGraph, TaskScheduler};
//!
//! let catalog = TransformCatalog::shared();
//! let mut graph = ProcessingGraph::new(48000.0);
//! let mut tasks = TaskScheduler::new(0.01);
//! let mut rng = StdRng::seed_from_u64(1);
//! let source = graph.add_source();
//!
//! let mut ctx = StageContext::new(&mut graph, &mut tasks, &mut rng, &catalog);
//! let echo = catalog.get(TransformId::new(23).unwrap())?;
//! ctx.begin_stage(echo.id);
//! let tail = echo.construct(&mut ctx, source)?;
//! let record = ctx.finish_stage().unwrap();
//! assert_eq!(record.nodes(), &[tail]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod context;
pub mod error;
pub mod id;
pub mod transforms;

pub use catalog::{CatalogBuilder, ConstructFn, TransformCatalog, TransformDescriptor};
pub use context::{StageContext, StageRecord};
pub use error::{CatalogError, StageError};
pub use id::{Category, TransformId, TransformKind};
pub use transforms::{CHAOS, CHAOS_PICKS, chaos_pool};
