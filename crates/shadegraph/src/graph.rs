// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and edges.

use crate::edge::{Edge, EdgeId, SlotRef};
use crate::node::{Node, NodeId};
use crate::slot::{Slot, SlotId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node graph.
///
/// Owns nodes and the directed edges between their slots. Nodes and
/// edges are created and removed here by the authoring surface;
/// validation only rewrites slot types and error flags in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Edges between slots
    edges: IndexMap<EdgeId, Edge>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its incident edges
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.edges.retain(|_, e| !e.involves_node(node_id));
        self.nodes.swap_remove(&node_id)
    }

    /// Remove a slot from a node, dropping edges that use it
    pub fn remove_slot(&mut self, slot_ref: SlotRef) -> Option<Slot> {
        self.edges.retain(|_, e| !e.involves_slot(slot_ref));
        self.nodes.get_mut(&slot_ref.node)?.remove_slot(slot_ref.slot)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a slot reference to its slot
    pub fn slot(&self, slot_ref: SlotRef) -> Option<&Slot> {
        self.nodes.get(&slot_ref.node)?.find_slot(slot_ref.slot)
    }

    /// Connect an output slot to an input slot.
    ///
    /// Rejects dangling endpoints, connections between slots of the same
    /// direction, self-loops, a second edge into an input, and edges
    /// that would close a cycle. Type compatibility is deliberately not
    /// checked here; validation flags type mismatches as slot errors so
    /// the author can see and fix them.
    pub fn connect(&mut self, from: SlotRef, to: SlotRef) -> Result<EdgeId, ConnectError> {
        let source_node = self
            .nodes
            .get(&from.node)
            .ok_or(ConnectError::NodeNotFound(from.node))?;
        let target_node = self
            .nodes
            .get(&to.node)
            .ok_or(ConnectError::NodeNotFound(to.node))?;

        let source_slot = source_node
            .find_slot(from.slot)
            .ok_or(ConnectError::SlotNotFound(from))?;
        let target_slot = target_node
            .find_slot(to.slot)
            .ok_or(ConnectError::SlotNotFound(to))?;

        if !source_slot.is_output() {
            return Err(ConnectError::SourceNotAnOutput(from));
        }
        if !target_slot.is_input() {
            return Err(ConnectError::TargetNotAnInput(to));
        }

        if from.node == to.node {
            return Err(ConnectError::SelfLoop);
        }

        if self.edges_into(to).next().is_some() {
            return Err(ConnectError::InputAlreadyConnected(to));
        }

        if self.reaches(to.node, from.node) {
            return Err(ConnectError::WouldCreateCycle);
        }

        let edge = Edge::new(from, to);
        let id = edge.id;
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Remove an edge
    pub fn disconnect(&mut self, edge_id: EdgeId) -> Option<Edge> {
        self.edges.swap_remove(&edge_id)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get edges arriving at an input slot
    pub fn edges_into(&self, slot_ref: SlotRef) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.to == slot_ref)
    }

    /// Get edges leaving an output slot
    pub fn edges_out_of(&self, slot_ref: SlotRef) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.from == slot_ref)
    }

    /// Get edges touching a node
    pub fn edges_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.involves_node(node_id))
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether any edge arrives at the given input slot
    pub fn is_slot_connected(&self, slot_ref: SlotRef) -> bool {
        self.edges_into(slot_ref).next().is_some()
    }

    /// Resolve the source feeding an input slot.
    ///
    /// Inputs accept a single edge, so this is the one upstream
    /// node/output-slot pair, or `None` when the input is unconnected or
    /// the edge endpoint no longer resolves.
    pub fn source_slot(&self, input: SlotRef) -> Option<(&Node, &Slot)> {
        let edge = self.edges_into(input).next()?;
        let node = self.node(edge.from.node)?;
        let slot = node.find_output_slot(edge.from.slot)?;
        Some((node, slot))
    }

    /// Whether `to` is reachable from `from` by following edges forward
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(node_id) = stack.pop() {
            if !visited.insert(node_id) {
                continue;
            }
            for edge in self.edges.values().filter(|e| e.from.node == node_id) {
                if edge.to.node == to {
                    return true;
                }
                stack.push(edge.to.node);
            }
        }
        false
    }

    /// Get nodes in topological order (upstream before downstream)
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();
        let mut order = Vec::new();

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                self.visit(*node_id, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        temp_mark: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), CycleError> {
        if temp_mark.contains(&node_id) {
            return Err(CycleError);
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        temp_mark.insert(node_id);

        // visit upstream dependencies first
        for edge in self.edges_for_node(node_id) {
            if edge.to.node == node_id {
                self.visit(edge.from.node, visited, temp_mark, order)?;
            }
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating an edge
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Slot not found
    #[error("Slot not found: {0:?}")]
    SlotNotFound(SlotRef),

    /// Source slot is not an output
    #[error("Source slot is not an output: {0:?}")]
    SourceNotAnOutput(SlotRef),

    /// Target slot is not an input
    #[error("Target slot is not an input: {0:?}")]
    TargetNotAnInput(SlotRef),

    /// Input slot already has an edge
    #[error("Input slot already connected: {0:?}")]
    InputAlreadyConnected(SlotRef),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Edge would close a cycle
    #[error("Connection would create a cycle")]
    WouldCreateCycle,
}

/// Error when the graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::ConcreteSlotType;

    fn constant_node() -> Node {
        let mut node = Node::new("scalar", "Scalar");
        node.add_slot(Slot::output(0, "Out", ConcreteSlotType::Scalar));
        node
    }

    fn add_node() -> Node {
        let mut node = Node::new("add", "Add");
        node.add_slot(Slot::dynamic_vector_input(0, "A"));
        node.add_slot(Slot::dynamic_vector_input(1, "B"));
        node.add_slot(Slot::dynamic_vector_output(2, "Out"));
        node
    }

    #[test]
    fn test_connect_and_query() {
        let mut graph = Graph::new("test");
        let c = graph.add_node(constant_node());
        let a = graph.add_node(add_node());

        let from = SlotRef::new(c, SlotId(0));
        let to = SlotRef::new(a, SlotId(0));
        let edge_id = graph.connect(from, to).unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.is_slot_connected(to));
        assert!(!graph.is_slot_connected(SlotRef::new(a, SlotId(1))));
        assert_eq!(graph.edge(edge_id).unwrap().from, from);

        let (src_node, src_slot) = graph.source_slot(to).unwrap();
        assert_eq!(src_node.id, c);
        assert_eq!(src_slot.id, SlotId(0));
    }

    #[test]
    fn test_connect_rejects_bad_directions() {
        let mut graph = Graph::new("test");
        let c1 = graph.add_node(constant_node());
        let c2 = graph.add_node(constant_node());
        let a = graph.add_node(add_node());

        // output -> output
        let err = graph
            .connect(SlotRef::new(c1, SlotId(0)), SlotRef::new(c2, SlotId(0)))
            .unwrap_err();
        assert!(matches!(err, ConnectError::TargetNotAnInput(_)));

        // input -> input
        let err = graph
            .connect(SlotRef::new(a, SlotId(0)), SlotRef::new(a, SlotId(1)))
            .unwrap_err();
        assert!(matches!(err, ConnectError::SourceNotAnOutput(_)));
    }

    #[test]
    fn test_connect_rejects_second_edge_into_input() {
        let mut graph = Graph::new("test");
        let c1 = graph.add_node(constant_node());
        let c2 = graph.add_node(constant_node());
        let a = graph.add_node(add_node());

        let to = SlotRef::new(a, SlotId(0));
        graph.connect(SlotRef::new(c1, SlotId(0)), to).unwrap();
        let err = graph.connect(SlotRef::new(c2, SlotId(0)), to).unwrap_err();
        assert!(matches!(err, ConnectError::InputAlreadyConnected(_)));
    }

    #[test]
    fn test_connect_rejects_cycles_and_self_loops() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(add_node());
        let b = graph.add_node(add_node());

        let err = graph
            .connect(SlotRef::new(a, SlotId(2)), SlotRef::new(a, SlotId(0)))
            .unwrap_err();
        assert!(matches!(err, ConnectError::SelfLoop));

        graph
            .connect(SlotRef::new(a, SlotId(2)), SlotRef::new(b, SlotId(0)))
            .unwrap();
        let err = graph
            .connect(SlotRef::new(b, SlotId(2)), SlotRef::new(a, SlotId(0)))
            .unwrap_err();
        assert!(matches!(err, ConnectError::WouldCreateCycle));
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = Graph::new("test");
        let c = graph.add_node(constant_node());
        let a = graph.add_node(add_node());
        graph
            .connect(SlotRef::new(c, SlotId(0)), SlotRef::new(a, SlotId(0)))
            .unwrap();

        graph.remove_node(c);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_remove_slot_drops_its_edges() {
        let mut graph = Graph::new("test");
        let c = graph.add_node(constant_node());
        let a = graph.add_node(add_node());
        let to = SlotRef::new(a, SlotId(0));
        graph.connect(SlotRef::new(c, SlotId(0)), to).unwrap();

        let removed = graph.remove_slot(to);
        assert!(removed.is_some());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.node(a).unwrap().find_slot(SlotId(0)).is_none());
    }

    #[test]
    fn test_topological_order_places_upstream_first() {
        let mut graph = Graph::new("test");
        let c = graph.add_node(constant_node());
        let a = graph.add_node(add_node());
        let b = graph.add_node(add_node());
        graph
            .connect(SlotRef::new(c, SlotId(0)), SlotRef::new(a, SlotId(0)))
            .unwrap();
        graph
            .connect(SlotRef::new(a, SlotId(2)), SlotRef::new(b, SlotId(0)))
            .unwrap();

        let order = graph.topological_order().unwrap();
        let pos = |id: NodeId| order.iter().position(|n| *n == id).unwrap();
        assert!(pos(c) < pos(a));
        assert!(pos(a) < pos(b));
    }
}
