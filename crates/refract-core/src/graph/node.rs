//! Graph node types.
//!
//! Each node in the processing graph has a [`NodeId`] and a [`NodeKind`] that
//! determines its role: the track source, a stage effect, the master gain,
//! the audible destination, or a capture tap. `NodeData` bundles the kind
//! with adjacency lists.

use crate::effect::Effect;

use super::edge::EdgeId;

/// Unique identifier for a node in the processing graph.
///
/// Slots of removed nodes are reused by later insertions, so storage stays
/// proportional to the live graph. An id is valid until its node is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Receiver for the post-master signal of a [`NodeKind::Tap`] node.
///
/// Called once per rendered block, in render order.
pub trait TapSink: Send {
    /// Receives one rendered block.
    fn on_block(&mut self, left: &[f32], right: &[f32]);
}

/// The role of a node in the processing graph.
pub enum NodeKind {
    /// Emits the decoded track. Exactly one per graph.
    Source,
    /// A stage effect inserted by a transform.
    Effect(Box<dyn Effect + Send>),
    /// Output volume. Exactly one per graph.
    MasterGain(f32),
    /// Audible output. Exactly one per graph.
    Destination,
    /// Capture point fed from the master gain.
    Tap(Box<dyn TapSink>),
}

impl NodeKind {
    /// The fieldless role of this node.
    pub fn role(&self) -> NodeRole {
        match self {
            Self::Source => NodeRole::Source,
            Self::Effect(_) => NodeRole::Effect,
            Self::MasterGain(_) => NodeRole::MasterGain,
            Self::Destination => NodeRole::Destination,
            Self::Tap(_) => NodeRole::Tap,
        }
    }
}

/// Fieldless counterpart of [`NodeKind`], for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Track source.
    Source,
    /// Stage effect.
    Effect,
    /// Master gain.
    MasterGain,
    /// Audible destination.
    Destination,
    /// Capture tap.
    Tap,
}

impl NodeRole {
    /// Lowercase label for logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Effect => "effect",
            Self::MasterGain => "master gain",
            Self::Destination => "destination",
            Self::Tap => "tap",
        }
    }
}

/// Internal bookkeeping for a node in the graph.
pub(crate) struct NodeData {
    pub kind: NodeKind,
    /// Edges arriving at this node.
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this node.
    pub outgoing: Vec<EdgeId>,
}

impl NodeData {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn role(&self) -> NodeRole {
        self.kind.role()
    }
}
