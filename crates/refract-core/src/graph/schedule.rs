//! Compiled render order.
//!
//! A valid graph is always a single chain, so compilation produces the list
//! of stage effects between the source and the master gain plus the
//! endpoints. The render loop walks this list instead of the adjacency lists.

use super::node::NodeId;

/// Validated, ordered view of a [`ProcessingGraph`](super::ProcessingGraph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSchedule {
    pub(crate) source: NodeId,
    pub(crate) effects: Vec<NodeId>,
    pub(crate) master: NodeId,
    pub(crate) destination: NodeId,
    pub(crate) tap: Option<NodeId>,
}

impl ChainSchedule {
    /// The source node.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Stage effect nodes in signal order.
    pub fn effects(&self) -> &[NodeId] {
        &self.effects
    }

    /// The master gain node.
    pub fn master(&self) -> NodeId {
        self.master
    }

    /// The destination node.
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// The capture tap, if one is attached.
    pub fn tap(&self) -> Option<NodeId> {
        self.tap
    }

    /// Source, effects, master gain and destination in signal order.
    pub fn path(&self) -> Vec<NodeId> {
        let mut path = Vec::with_capacity(self.effects.len() + 3);
        path.push(self.source);
        path.extend_from_slice(&self.effects);
        path.push(self.master);
        path.push(self.destination);
        path
    }
}
