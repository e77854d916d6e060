//! Transform descriptors and the catalog that holds them.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use refract_core::NodeId;
use serde::Serialize;

use crate::context::StageContext;
use crate::error::{CatalogError, StageError};
use crate::id::{Category, TransformId, TransformKind};

/// Constructor signature: build the stage after `upstream` and return the
/// node the next stage should connect from.
pub type ConstructFn = fn(&mut StageContext<'_>, NodeId) -> Result<NodeId, StageError>;

/// Immutable description of one transform.
#[derive(Clone, Serialize)]
pub struct TransformDescriptor {
    /// Unique id; also the position in the fold.
    pub id: TransformId,
    /// Display name.
    pub name: &'static str,
    /// UI grouping.
    pub category: Category,
    /// One-line summary.
    pub description: &'static str,
    /// What the constructor does to the graph.
    pub kind: TransformKind,
    #[serde(skip)]
    constructor: ConstructFn,
}

impl TransformDescriptor {
    /// Creates a descriptor.
    pub fn new(
        id: TransformId,
        name: &'static str,
        category: Category,
        description: &'static str,
        kind: TransformKind,
        constructor: ConstructFn,
    ) -> Self {
        Self {
            id,
            name,
            category,
            description,
            kind,
            constructor,
        }
    }

    /// Builds this transform's stage after `upstream` and returns the
    /// terminal node. A rate-only transform returns `upstream` unchanged.
    pub fn construct(
        &self,
        ctx: &mut StageContext<'_>,
        upstream: NodeId,
    ) -> Result<NodeId, StageError> {
        (self.constructor)(ctx, upstream)
    }
}

impl core::fmt::Debug for TransformDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransformDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Read-only set of transforms, ordered by id.
///
/// # Example
///
/// ```rust
/// use refract_catalog::{Category, TransformCatalog, TransformId};
///
/// let catalog = TransformCatalog::shared();
/// assert_eq!(catalog.len(), 50);
///
/// let bass = catalog.get(TransformId::new(1).unwrap())?;
/// assert_eq!(bass.name, "Bass Boost");
///
/// let retro: Vec<_> = catalog.by_category(Category::Retro).map(|d| d.name).collect();
/// assert!(retro.contains(&"Vinyl"));
/// # Ok::<(), refract_catalog::CatalogError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransformCatalog {
    entries: BTreeMap<TransformId, TransformDescriptor>,
}

impl TransformCatalog {
    /// The built-in catalog, built once per process.
    pub fn shared() -> Arc<TransformCatalog> {
        static BUILTIN: OnceLock<Arc<TransformCatalog>> = OnceLock::new();
        Arc::clone(BUILTIN.get_or_init(|| {
            let catalog = Self::builtin();
            tracing::debug!("catalog_init: {} transforms", catalog.len());
            Arc::new(catalog)
        }))
    }

    /// A fresh copy of the built-in catalog.
    pub fn builtin() -> Self {
        let entries = crate::transforms::builtin_descriptors()
            .into_iter()
            .map(|d| (d.id, d))
            .collect();
        Self { entries }
    }

    /// A catalog with no transforms.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts a catalog from scratch.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Every descriptor in ascending id order.
    pub fn list_all(&self) -> impl Iterator<Item = &TransformDescriptor> {
        self.entries.values()
    }

    /// Looks up a descriptor.
    pub fn get(&self, id: TransformId) -> Result<&TransformDescriptor, CatalogError> {
        self.entries.get(&id).ok_or(CatalogError::NotFound(id))
    }

    /// Looks up a descriptor by raw id.
    pub fn get_raw(&self, raw: u16) -> Result<&TransformDescriptor, CatalogError> {
        let id = TransformId::new(raw).ok_or(CatalogError::InvalidId(raw))?;
        self.get(id)
    }

    /// Descriptors in one category, ascending id. Each call starts over.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &TransformDescriptor> {
        self.entries.values().filter(move |d| d.category == category)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: TransformId) -> bool {
        self.entries.contains_key(&id)
    }

    /// All registered ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of transforms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no transforms are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assembles a [`TransformCatalog`] from the built-ins and custom descriptors.
///
/// ```rust
/// use refract_catalog::{Category, TransformCatalog, TransformDescriptor, TransformId, TransformKind};
///
/// let passthrough = TransformDescriptor::new(
///     TransformId::new(100).unwrap(),
///     "Passthrough",
///     Category::Basic,
///     "Does nothing",
///     TransformKind::RateOnly,
///     |_ctx, upstream| Ok(upstream),
/// );
/// let catalog = TransformCatalog::builder()
///     .with_builtins()
///     .register(passthrough)?
///     .build();
/// assert_eq!(catalog.len(), 51);
/// # Ok::<(), refract_catalog::CatalogError>(())
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: BTreeMap<TransformId, TransformDescriptor>,
}

impl CatalogBuilder {
    /// Adds the 50 built-in transforms.
    pub fn with_builtins(mut self) -> Self {
        for descriptor in crate::transforms::builtin_descriptors() {
            self.entries.insert(descriptor.id, descriptor);
        }
        self
    }

    /// Adds one descriptor, rejecting an id that is already taken.
    pub fn register(mut self, descriptor: TransformDescriptor) -> Result<Self, CatalogError> {
        if self.entries.contains_key(&descriptor.id) {
            return Err(CatalogError::DuplicateId(descriptor.id));
        }
        self.entries.insert(descriptor.id, descriptor);
        Ok(self)
    }

    /// Finishes the catalog.
    pub fn build(self) -> TransformCatalog {
        TransformCatalog {
            entries: self.entries,
        }
    }
}
