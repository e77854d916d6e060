//! The set of transforms the user has switched on.

use std::collections::BTreeSet;

use refract_catalog::TransformId;
use serde::{Deserialize, Serialize};

/// Active transform ids, always iterated in ascending id order.
///
/// The order in which transforms were toggled has no effect on the graph.
///
/// ```rust
/// use refract_catalog::TransformId;
/// use refract_engine::ActivationSet;
///
/// let id = |raw| TransformId::new(raw).unwrap();
/// let mut active = ActivationSet::new();
/// active.toggle(id(40));
/// active.toggle(id(3));
/// assert_eq!(active.ids(), vec![id(3), id(40)]);
/// assert!(!active.toggle(id(40)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationSet {
    ids: BTreeSet<TransformId>,
}

impl ActivationSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id` and returns the new membership.
    pub fn toggle(&mut self, id: TransformId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Whether `id` is active.
    pub fn contains(&self, id: TransformId) -> bool {
        self.ids.contains(&id)
    }

    /// Active ids, ascending.
    pub fn iter(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.ids.iter().copied()
    }

    /// Active ids collected, ascending.
    pub fn ids(&self) -> Vec<TransformId> {
        self.iter().collect()
    }

    /// Number of active transforms.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nothing is active.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Deactivates everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<TransformId> for ActivationSet {
    fn from_iter<I: IntoIterator<Item = TransformId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
