//! Connections between stage nodes.

use super::node::NodeId;

/// Handle to one connection in a [`ProcessingGraph`](super::ProcessingGraph).
///
/// A disconnected edge's slot is handed to the next connection, so a handle
/// is only meaningful until its edge is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Slot number inside the owning graph.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// Audio flows `from` one node `to` the next.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}
