//! Playback rate resolution.
//!
//! Rate-changing transforms do not insert nodes; they request a playback
//! rate during the rebuild fold. After the fold the coordinator decides the
//! rate the source actually plays at, from scratch on every rebuild.

use std::collections::BTreeSet;

use refract_catalog::TransformId;

/// Speed Up, Slow Down, Chipmunk and Deep Voice.
const RESET_SUBSET: [u16; 4] = [3, 4, 11, 12];

/// Decides the playback rate after each rebuild.
///
/// The rule only honours a rate request while at least one transform of the
/// reset subset is active. With none of them active the rate returns to 1.0,
/// even if another transform (Nightcore, Vaporwave) asked for a different
/// rate during the fold.
///
/// ```rust
/// use refract_catalog::TransformId;
/// use refract_engine::RateCoordinator;
///
/// let id = |raw| TransformId::new(raw).unwrap();
/// let rates = RateCoordinator::default();
/// assert_eq!(rates.resolve([id(3)], Some(1.3)), 1.3);
/// // Nightcore alone: its request is not honoured.
/// assert_eq!(rates.resolve([id(33)], Some(1.25)), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCoordinator {
    reset_subset: BTreeSet<TransformId>,
}

impl Default for RateCoordinator {
    fn default() -> Self {
        Self::new(RESET_SUBSET.iter().filter_map(|&raw| TransformId::new(raw)))
    }
}

impl RateCoordinator {
    /// Neutral playback rate.
    pub const UNITY: f32 = 1.0;

    /// A coordinator with a custom reset subset.
    pub fn new(reset_subset: impl IntoIterator<Item = TransformId>) -> Self {
        Self {
            reset_subset: reset_subset.into_iter().collect(),
        }
    }

    /// Whether `id` belongs to the reset subset.
    pub fn is_reset_member(&self, id: TransformId) -> bool {
        self.reset_subset.contains(&id)
    }

    /// The reset subset, ascending.
    pub fn reset_subset(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.reset_subset.iter().copied()
    }

    /// Resolves the rate for the active ids and the last request of the fold.
    ///
    /// Non-finite or non-positive requests resolve to 1.0.
    pub fn resolve(
        &self,
        active: impl IntoIterator<Item = TransformId>,
        last_request: Option<f32>,
    ) -> f32 {
        let honoured = active.into_iter().any(|id| self.is_reset_member(id));
        match last_request {
            Some(rate) if honoured && rate.is_finite() && rate > 0.0 => rate,
            _ => Self::UNITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u16) -> TransformId {
        TransformId::new(raw).unwrap()
    }

    #[test]
    fn test_no_request_is_unity() {
        let rates = RateCoordinator::default();
        assert_eq!(rates.resolve(std::iter::empty(), None), 1.0);
        assert_eq!(rates.resolve([id(3)], None), 1.0);
    }

    #[test]
    fn test_reset_member_honours_last_writer() {
        let rates = RateCoordinator::default();
        // Nightcore (33) folds after Speed Up (3) and overwrites its request.
        assert_eq!(rates.resolve([id(3), id(33)], Some(1.25)), 1.25);
        assert_eq!(rates.resolve([id(4)], Some(0.8)), 0.8);
    }

    #[test]
    fn test_non_members_resolve_to_unity() {
        let rates = RateCoordinator::default();
        assert_eq!(rates.resolve([id(33)], Some(1.25)), 1.0);
        assert_eq!(rates.resolve([id(34), id(1)], Some(0.85)), 1.0);
    }

    #[test]
    fn test_rejects_unusable_rates() {
        let rates = RateCoordinator::default();
        assert_eq!(rates.resolve([id(3)], Some(0.0)), 1.0);
        assert_eq!(rates.resolve([id(3)], Some(f32::NAN)), 1.0);
    }

    #[test]
    fn test_subset_contents() {
        let rates = RateCoordinator::default();
        let raw: Vec<u16> = rates.reset_subset().map(TransformId::get).collect();
        assert_eq!(raw, vec![3, 4, 11, 12]);
        assert!(!rates.is_reset_member(id(33)));
    }
}
