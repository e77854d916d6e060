//! Processing graph: mutation API, chain validation, and block execution.
//!
//! [`ProcessingGraph`] owns the topology of one loaded track: the source,
//! the stage effects inserted by active transforms, the master gain, the
//! audible destination and, while exporting, a capture tap.
//!
//! The only valid shape is a single chain:
//!
//! ```text
//! Source → stage → … → stage → MasterGain → Destination
//!                                   └──────→ Tap (optional)
//! ```
//!
//! [`connect`](ProcessingGraph::connect) enforces the local rules (fan-out
//! only from the master gain, one input per stage, no cycles) and
//! [`compile`](ProcessingGraph::compile) checks the global shape and produces
//! the [`ChainSchedule`] that [`process_block`](ProcessingGraph::process_block)
//! walks. Any mutation invalidates the schedule until the next compile.

use crate::effect::Effect;

use super::edge::{Edge, EdgeId};
use super::node::{NodeData, NodeId, NodeKind, NodeRole, TapSink};
use super::schedule::ChainSchedule;

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The specified node was not found in the graph.
    NodeNotFound(NodeId),
    /// The specified edge was not found in the graph.
    EdgeNotFound(EdgeId),
    /// Adding this edge would create a cycle.
    CycleDetected,
    /// A duplicate edge already exists between these nodes.
    DuplicateEdge(NodeId, NodeId),
    /// The edge breaks a structural rule (e.g. an edge into the source).
    InvalidConnection(String),
    /// A singleton role is missing or duplicated.
    InvalidNodeCount {
        /// The role that was counted.
        role: NodeRole,
        /// How many nodes of that role exist.
        count: usize,
    },
    /// The chain stops at this node before reaching its end.
    BrokenChain(NodeId),
    /// This effect node is not on the source → master gain path.
    DanglingNode(NodeId),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::EdgeNotFound(id) => write!(f, "edge {id} not found"),
            Self::CycleDetected => write!(f, "adding this edge would create a cycle"),
            Self::DuplicateEdge(a, b) => write!(f, "edge from {a} to {b} already exists"),
            Self::InvalidConnection(msg) => write!(f, "invalid connection: {msg}"),
            Self::InvalidNodeCount { role, count } => {
                write!(f, "expected exactly one {} node, found {count}", role.name())
            }
            Self::BrokenChain(id) => write!(f, "chain is broken after {id}"),
            Self::DanglingNode(id) => write!(f, "{id} is not connected to the chain"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Directed graph of one track's signal path.
///
/// # Usage
///
/// 1. Create with [`new()`](Self::new)
/// 2. Add the fixed nodes: [`add_source()`](Self::add_source),
///    [`add_master_gain()`](Self::add_master_gain),
///    [`add_destination()`](Self::add_destination)
/// 3. Insert stages with [`add_effect()`](Self::add_effect) and
///    [`connect()`](Self::connect)
/// 4. [`compile()`](Self::compile), then
///    [`process_block()`](Self::process_block) per render block
pub struct ProcessingGraph {
    nodes: Vec<Option<NodeData>>,
    edges: Vec<Option<Edge>>,
    schedule: Option<ChainSchedule>,
    sample_rate: f32,
    free_nodes: Vec<u32>,
    free_edges: Vec<u32>,
}

impl core::fmt::Debug for ProcessingGraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProcessingGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("sample_rate", &self.sample_rate)
            .field("schedule", &self.schedule)
            .finish()
    }
}

impl ProcessingGraph {
    /// Creates an empty graph at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            schedule: None,
            sample_rate,
            free_nodes: Vec::new(),
            free_edges: Vec::new(),
        }
    }

    // --- Node mutations ---

    /// Adds the track source node.
    pub fn add_source(&mut self) -> NodeId {
        self.add_node(NodeKind::Source)
    }

    /// Adds the master gain node with a linear gain.
    pub fn add_master_gain(&mut self, gain: f32) -> NodeId {
        self.add_node(NodeKind::MasterGain(gain))
    }

    /// Adds the audible destination node.
    pub fn add_destination(&mut self) -> NodeId {
        self.add_node(NodeKind::Destination)
    }

    /// Adds a stage effect node. The effect is set to the graph's sample rate.
    pub fn add_effect(&mut self, mut effect: Box<dyn Effect + Send>) -> NodeId {
        effect.set_sample_rate(self.sample_rate);
        self.add_node(NodeKind::Effect(effect))
    }

    /// Adds a capture tap node. It must be connected from the master gain.
    pub fn add_tap(&mut self, sink: Box<dyn TapSink>) -> NodeId {
        self.add_node(NodeKind::Tap(sink))
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        #[cfg(feature = "tracing")]
        let role = kind.role();
        let data = Some(NodeData::new(kind));
        let id = match self.free_nodes.pop() {
            Some(slot) => {
                self.nodes[slot as usize] = data;
                NodeId(slot)
            }
            None => {
                self.nodes.push(data);
                NodeId((self.nodes.len() - 1) as u32)
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {} node {id}", role.name());
        self.schedule = None;
        id
    }

    /// Removes a node and all its edges.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.node(id)?;
        let edge_ids: Vec<EdgeId> = node
            .incoming
            .iter()
            .chain(&node.outgoing)
            .copied()
            .collect();
        for edge_id in edge_ids {
            self.disconnect_internal(edge_id);
        }
        self.nodes[id.0 as usize] = None;
        self.free_nodes.push(id.0);
        self.schedule = None;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        Ok(())
    }

    // --- Edge mutations ---

    /// Connects two nodes with a directed edge.
    ///
    /// Fails if either node is missing, the edge already exists, the edge
    /// would create a cycle, or it breaks a structural rule:
    /// - nothing flows into the source, nothing flows out of the destination
    ///   or a tap
    /// - the destination and taps are fed only by the master gain, and the
    ///   master gain feeds only those
    /// - the source and stage effects have one output; stage effects, the
    ///   master gain, the destination and taps have one input
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, GraphError> {
        self.validate_connection(from, to)?;

        if self.find_edge(from, to).is_some() {
            return Err(GraphError::DuplicateEdge(from, to));
        }
        // A cycle exists if `to` can already reach `from`.
        if from == to || self.can_reach(to, from) {
            return Err(GraphError::CycleDetected);
        }

        let edge = Some(Edge { from, to });
        let edge_id = match self.free_edges.pop() {
            Some(slot) => {
                self.edges[slot as usize] = edge;
                EdgeId(slot)
            }
            None => {
                self.edges.push(edge);
                EdgeId((self.edges.len() - 1) as u32)
            }
        };

        if let Some(Some(node)) = self.nodes.get_mut(from.0 as usize) {
            node.outgoing.push(edge_id);
        }
        if let Some(Some(node)) = self.nodes.get_mut(to.0 as usize) {
            node.incoming.push(edge_id);
        }
        self.schedule = None;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {from} → {to}");
        Ok(edge_id)
    }

    /// Removes an edge.
    pub fn disconnect(&mut self, id: EdgeId) -> Result<(), GraphError> {
        if self.edge(id).is_none() {
            return Err(GraphError::EdgeNotFound(id));
        }
        self.disconnect_internal(id);
        self.schedule = None;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: edge {id}");
        Ok(())
    }

    /// Removes every edge leaving `id`. Returns how many were removed.
    pub fn disconnect_outgoing(&mut self, id: NodeId) -> Result<usize, GraphError> {
        let outgoing = self.node(id)?.outgoing.clone();
        for edge_id in &outgoing {
            self.disconnect_internal(*edge_id);
        }
        if !outgoing.is_empty() {
            self.schedule = None;
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_disconnect: {} edges from {id}", outgoing.len());
        }
        Ok(outgoing.len())
    }

    fn disconnect_internal(&mut self, id: EdgeId) {
        let Some(edge) = self.edges.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };
        self.free_edges.push(id.0);
        if let Some(Some(node)) = self.nodes.get_mut(edge.from.0 as usize) {
            node.outgoing.retain(|&e| e != id);
        }
        if let Some(Some(node)) = self.nodes.get_mut(edge.to.0 as usize) {
            node.incoming.retain(|&e| e != id);
        }
    }

    fn validate_connection(&self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        let from_node = self.node(from)?;
        let to_node = self.node(to)?;
        let (from_role, to_role) = (from_node.role(), to_node.role());
        let invalid = |msg: String| Err(GraphError::InvalidConnection(msg));

        match (from_role, to_role) {
            (_, NodeRole::Source) => invalid(format!("{to} is a source and takes no input")),
            (NodeRole::Destination | NodeRole::Tap, _) => {
                invalid(format!("{from} is a {} and has no output", from_role.name()))
            }
            (NodeRole::MasterGain, NodeRole::Destination | NodeRole::Tap) => {
                if to_node.incoming.is_empty() {
                    Ok(())
                } else {
                    invalid(format!("{to} already has an input"))
                }
            }
            (NodeRole::MasterGain, _) => invalid(format!(
                "master gain may only feed the destination or a tap, not {}",
                to_role.name()
            )),
            (_, NodeRole::Destination | NodeRole::Tap) => invalid(format!(
                "{} {to} must be fed by the master gain",
                to_role.name()
            )),
            (NodeRole::Source | NodeRole::Effect, NodeRole::Effect | NodeRole::MasterGain) => {
                if !from_node.outgoing.is_empty() {
                    invalid(format!("{from} already has an output"))
                } else if !to_node.incoming.is_empty() {
                    invalid(format!("{to} already has an input"))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// DFS reachability along outgoing edges.
    fn can_reach(&self, start: NodeId, target: NodeId) -> bool {
        let mut stack = vec![start];
        let mut visited = vec![false; self.nodes.len()];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            let idx = current.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            stack.extend(self.successors(current));
        }
        false
    }

    // --- Queries ---

    fn node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Whether the node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// The node's role, if it exists.
    pub fn role(&self, id: NodeId) -> Option<NodeRole> {
        self.node(id).ok().map(NodeData::role)
    }

    /// The edge from `from` to `to`, if any.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        let node = self.node(from).ok()?;
        node.outgoing
            .iter()
            .copied()
            .find(|&e| self.edge(e).is_some_and(|edge| edge.to == to))
    }

    /// Nodes fed by `id`.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| {
                n.outgoing
                    .iter()
                    .filter_map(|&e| self.edge(e).map(|edge| edge.to))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes feeding `id`.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| {
                n.incoming
                    .iter()
                    .filter_map(|&e| self.edge(e).map(|edge| edge.from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of every live node with the given role, ascending.
    pub fn nodes_with_role(&self, role: NodeRole) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_ref().is_some_and(|n| n.role() == role))
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Allocated node slots, live or free.
    pub fn node_slots(&self) -> usize {
        self.nodes.len()
    }

    /// Allocated edge slots, live or free.
    pub fn edge_slots(&self) -> usize {
        self.edges.len()
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Propagates a new sample rate to every effect.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for node in self.nodes.iter_mut().flatten() {
            if let NodeKind::Effect(effect) = &mut node.kind {
                effect.set_sample_rate(sample_rate);
            }
        }
    }

    /// Clears the internal state of every effect.
    pub fn reset_effects(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            if let NodeKind::Effect(effect) = &mut node.kind {
                effect.reset();
            }
        }
    }

    /// Sets the linear gain of every master gain node.
    pub fn set_master_gain(&mut self, gain: f32) {
        for node in self.nodes.iter_mut().flatten() {
            if let NodeKind::MasterGain(g) = &mut node.kind {
                *g = gain;
            }
        }
    }

    /// The compiled schedule, if the graph has not changed since the last
    /// successful compile.
    pub fn schedule(&self) -> Option<&ChainSchedule> {
        self.schedule.as_ref()
    }

    // --- Compilation ---

    fn single(&self, role: NodeRole) -> Result<NodeId, GraphError> {
        match self.nodes_with_role(role).as_slice() {
            [id] => Ok(*id),
            other => Err(GraphError::InvalidNodeCount {
                role,
                count: other.len(),
            }),
        }
    }

    /// Validates the chain shape and builds the render schedule.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidNodeCount`] unless there is exactly one source,
    ///   master gain and destination, and at most one tap
    /// - [`GraphError::BrokenChain`] if the path from the source stops before
    ///   the master gain, or the master gain does not feed the destination
    /// - [`GraphError::DanglingNode`] for an effect off the path
    pub fn compile(&mut self) -> Result<&ChainSchedule, GraphError> {
        let source = self.single(NodeRole::Source)?;
        let master = self.single(NodeRole::MasterGain)?;
        let destination = self.single(NodeRole::Destination)?;
        let taps = self.nodes_with_role(NodeRole::Tap);
        if taps.len() > 1 {
            return Err(GraphError::InvalidNodeCount {
                role: NodeRole::Tap,
                count: taps.len(),
            });
        }

        let mut effects = Vec::new();
        let mut current = source;
        loop {
            let next = match self.successors(current).as_slice() {
                [next] => *next,
                _ => return Err(GraphError::BrokenChain(current)),
            };
            if next == master {
                break;
            }
            if effects.len() > self.nodes.len() {
                return Err(GraphError::CycleDetected);
            }
            effects.push(next);
            current = next;
        }

        let master_out = self.successors(master);
        if !master_out.contains(&destination) {
            return Err(GraphError::BrokenChain(master));
        }
        let tap = taps.first().copied().filter(|t| master_out.contains(t));
        if let Some(&orphan) = taps.first()
            && tap.is_none()
        {
            return Err(GraphError::DanglingNode(orphan));
        }

        if let Some(orphan) = self
            .nodes_with_role(NodeRole::Effect)
            .into_iter()
            .find(|id| !effects.contains(id))
        {
            return Err(GraphError::DanglingNode(orphan));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_compile: {} stages, tap {}",
            effects.len(),
            if tap.is_some() { "attached" } else { "none" }
        );

        let schedule = self.schedule.insert(ChainSchedule {
            source,
            effects,
            master,
            destination,
            tap,
        });
        Ok(&*schedule)
    }

    // --- Rendering ---

    /// Runs one block through the compiled chain in place.
    ///
    /// `left`/`right` hold the source signal on entry and the master output
    /// on return. The tap, if attached, receives the master output. Without
    /// a valid schedule the block is silenced.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let Self {
            nodes, schedule, ..
        } = self;
        let Some(schedule) = schedule.as_ref() else {
            left.fill(0.0);
            right.fill(0.0);
            return;
        };

        for id in &schedule.effects {
            if let Some(Some(NodeData {
                kind: NodeKind::Effect(effect),
                ..
            })) = nodes.get_mut(id.0 as usize)
            {
                effect.process_block_stereo(left, right);
            }
        }

        if let Some(Some(NodeData {
            kind: NodeKind::MasterGain(gain),
            ..
        })) = nodes.get(schedule.master.0 as usize)
        {
            let gain = *gain;
            if gain != 1.0 {
                for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                    *l *= gain;
                    *r *= gain;
                }
            }
        }

        if let Some(tap) = schedule.tap
            && let Some(Some(NodeData {
                kind: NodeKind::Tap(sink),
                ..
            })) = nodes.get_mut(tap.0 as usize)
        {
            sink.on_block(left, right);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Gain;
    use std::sync::{Arc, Mutex};

    struct Recorder(Arc<Mutex<Vec<f32>>>);

    impl TapSink for Recorder {
        fn on_block(&mut self, left: &[f32], _right: &[f32]) {
            if let Ok(mut buf) = self.0.lock() {
                buf.extend_from_slice(left);
            }
        }
    }

    fn skeleton() -> (ProcessingGraph, NodeId, NodeId, NodeId) {
        let mut graph = ProcessingGraph::new(48000.0);
        let source = graph.add_source();
        let master = graph.add_master_gain(1.0);
        let dest = graph.add_destination();
        graph.connect(master, dest).unwrap();
        (graph, source, master, dest)
    }

    // --- Mutation tests ---

    #[test]
    fn test_add_nodes() {
        let (mut graph, source, master, dest) = skeleton();
        let effect = graph.add_effect(Box::new(Gain::new(2.0)));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.role(effect), Some(NodeRole::Effect));
        assert_eq!(graph.role(source), Some(NodeRole::Source));
        assert_eq!(graph.role(master), Some(NodeRole::MasterGain));
        assert_eq!(graph.role(dest), Some(NodeRole::Destination));
    }

    #[test]
    fn test_connect_into_source_rejected() {
        let (mut graph, source, _, _) = skeleton();
        let effect = graph.add_effect(Box::new(Gain::new(1.0)));
        assert!(matches!(
            graph.connect(effect, source),
            Err(GraphError::InvalidConnection(_))
        ));
    }

    #[test]
    fn test_connect_from_destination_rejected() {
        let (mut graph, _, _, dest) = skeleton();
        let effect = graph.add_effect(Box::new(Gain::new(1.0)));
        assert!(matches!(
            graph.connect(dest, effect),
            Err(GraphError::InvalidConnection(_))
        ));
    }

    #[test]
    fn test_effect_fan_out_rejected() {
        let (mut graph, source, _, _) = skeleton();
        let a = graph.add_effect(Box::new(Gain::new(1.0)));
        let b = graph.add_effect(Box::new(Gain::new(1.0)));
        graph.connect(source, a).unwrap();
        assert!(matches!(
            graph.connect(source, b),
            Err(GraphError::InvalidConnection(_))
        ));
    }

    #[test]
    fn test_cycle_detection() {
        let (mut graph, _, _, _) = skeleton();
        let a = graph.add_effect(Box::new(Gain::new(1.0)));
        let b = graph.add_effect(Box::new(Gain::new(1.0)));
        graph.connect(a, b).unwrap();
        assert_eq!(graph.connect(b, a), Err(GraphError::CycleDetected));
        assert_eq!(graph.connect(a, a), Err(GraphError::InvalidConnection(
            format!("{a} already has an output")
        )));
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let (mut graph, _, master, dest) = skeleton();
        assert_eq!(
            graph.connect(master, dest),
            Err(GraphError::DuplicateEdge(master, dest))
        );
    }

    #[test]
    fn test_removed_slots_are_reused() {
        let (mut graph, source, master, _) = skeleton();
        graph.connect(source, master).unwrap();
        let (nodes, edges) = (graph.node_slots(), graph.edge_slots());

        for _ in 0..1000 {
            let wire = graph.find_edge(source, master).unwrap();
            graph.disconnect(wire).unwrap();
            let effect = graph.add_effect(Box::new(Gain::new(1.0)));
            graph.connect(source, effect).unwrap();
            graph.connect(effect, master).unwrap();
            graph.compile().unwrap();
            graph.remove_node(effect).unwrap();
            graph.connect(source, master).unwrap();
        }

        assert_eq!(graph.node_slots(), nodes + 1);
        assert!(graph.edge_slots() <= edges + 2);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        graph.compile().unwrap();
    }

    #[test]
    fn test_remove_node_drops_edges() {
        let (mut graph, source, master, _) = skeleton();
        let effect = graph.add_effect(Box::new(Gain::new(1.0)));
        graph.connect(source, effect).unwrap();
        graph.connect(effect, master).unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.predecessors(master), vec![effect]);

        graph.remove_node(effect).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.contains(effect));
        assert!(graph.successors(source).is_empty());
        assert!(graph.predecessors(master).is_empty());
        assert_eq!(
            graph.remove_node(effect),
            Err(GraphError::NodeNotFound(effect))
        );
    }

    #[test]
    fn test_disconnect_outgoing() {
        let (mut graph, source, master, _) = skeleton();
        graph.connect(source, master).unwrap();
        assert_eq!(graph.disconnect_outgoing(source), Ok(1));
        assert_eq!(graph.disconnect_outgoing(source), Ok(0));
        assert!(graph.find_edge(source, master).is_none());
    }

    #[test]
    fn test_disconnect_nonexistent() {
        let (mut graph, _, _, _) = skeleton();
        assert_eq!(
            graph.disconnect(EdgeId(99)),
            Err(GraphError::EdgeNotFound(EdgeId(99)))
        );
    }

    // --- Compilation tests ---

    #[test]
    fn test_compile_direct_passthrough() {
        let (mut graph, source, master, dest) = skeleton();
        graph.connect(source, master).unwrap();
        let schedule = graph.compile().unwrap();
        assert!(schedule.effects().is_empty());
        assert_eq!(schedule.path(), vec![source, master, dest]);
    }

    #[test]
    fn test_compile_chain_order() {
        let (mut graph, source, master, _) = skeleton();
        let a = graph.add_effect(Box::new(Gain::new(1.0)));
        let b = graph.add_effect(Box::new(Gain::new(1.0)));
        // Connect out of insertion order; the schedule follows edges.
        graph.connect(source, b).unwrap();
        graph.connect(b, a).unwrap();
        graph.connect(a, master).unwrap();
        assert_eq!(graph.compile().unwrap().effects(), &[b, a]);
    }

    #[test]
    fn test_compile_broken_chain() {
        let (mut graph, source, _, _) = skeleton();
        let a = graph.add_effect(Box::new(Gain::new(1.0)));
        graph.connect(source, a).unwrap();
        assert_eq!(graph.compile().err(), Some(GraphError::BrokenChain(a)));
    }

    #[test]
    fn test_compile_dangling_effect() {
        let (mut graph, source, master, _) = skeleton();
        graph.connect(source, master).unwrap();
        let orphan = graph.add_effect(Box::new(Gain::new(1.0)));
        assert_eq!(graph.compile().err(), Some(GraphError::DanglingNode(orphan)));
    }

    #[test]
    fn test_compile_requires_single_source() {
        let mut graph = ProcessingGraph::new(48000.0);
        graph.add_master_gain(1.0);
        graph.add_destination();
        assert_eq!(
            graph.compile().err(),
            Some(GraphError::InvalidNodeCount {
                role: NodeRole::Source,
                count: 0
            })
        );
    }

    #[test]
    fn test_mutation_invalidates_schedule() {
        let (mut graph, source, master, _) = skeleton();
        graph.connect(source, master).unwrap();
        graph.compile().unwrap();
        assert!(graph.schedule().is_some());
        graph.add_effect(Box::new(Gain::new(1.0)));
        assert!(graph.schedule().is_none());
    }

    // --- Rendering tests ---

    #[test]
    fn test_process_without_schedule_is_silent() {
        let (mut graph, _, _, _) = skeleton();
        let mut left = [1.0; 4];
        let mut right = [1.0; 4];
        graph.process_block(&mut left, &mut right);
        assert_eq!(left, [0.0; 4]);
        assert_eq!(right, [0.0; 4]);
    }

    #[test]
    fn test_process_chain_and_master() {
        let (mut graph, source, master, _) = skeleton();
        let a = graph.add_effect(Box::new(Gain::new(2.0)));
        let b = graph.add_effect(Box::new(Gain::new(3.0)));
        graph.connect(source, a).unwrap();
        graph.connect(a, b).unwrap();
        graph.connect(b, master).unwrap();
        graph.set_master_gain(0.5);
        graph.compile().unwrap();

        let mut left = [1.0, 0.5];
        let mut right = [-1.0, 0.0];
        graph.process_block(&mut left, &mut right);
        assert_eq!(left, [3.0, 1.5]);
        assert_eq!(right, [-3.0, 0.0]);
    }

    #[test]
    fn test_tap_receives_master_output() {
        let (mut graph, source, master, _) = skeleton();
        graph.connect(source, master).unwrap();
        graph.set_master_gain(0.25);
        let captured = Arc::new(Mutex::new(Vec::new()));
        let tap = graph.add_tap(Box::new(Recorder(Arc::clone(&captured))));
        graph.connect(master, tap).unwrap();
        assert_eq!(graph.compile().unwrap().tap(), Some(tap));

        let mut left = [1.0, 2.0];
        let mut right = [0.0, 0.0];
        graph.process_block(&mut left, &mut right);
        assert_eq!(*captured.lock().unwrap(), vec![0.25, 0.5]);
    }

    #[test]
    fn test_tap_must_follow_master() {
        let (mut graph, source, _, _) = skeleton();
        let tap = graph.add_tap(Box::new(Recorder(Arc::new(Mutex::new(Vec::new())))));
        assert!(matches!(
            graph.connect(source, tap),
            Err(GraphError::InvalidConnection(_))
        ));
    }
}
