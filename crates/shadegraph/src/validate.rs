// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot type resolution and graph validation.
//!
//! Validation recomputes per-slot and per-node error flags and resolves
//! concrete types for dynamically-typed slots. It never fails: type
//! mismatches are authoring states, surfaced as error flags the editing
//! surface can display, and a node's version counter advances only on a
//! pass that ends clean.

use crate::edge::SlotRef;
use crate::graph::{CycleError, Graph};
use crate::node::NodeId;
use crate::registry::NodeRegistry;
use crate::slot::{ConcreteSlotType, SlotId, SlotKind};

/// Resolve one concrete type from the types feeding a node's
/// dynamic-vector slots.
///
/// No candidates fall back to [`ConcreteSlotType::Scalar`]. A single
/// distinct candidate wins outright. With several distinct candidates,
/// scalars are dropped (they promote to any width) and the widest
/// remaining type wins; if only scalars were present the fallback wins.
pub fn resolve_dynamic_vector_type(candidates: &[ConcreteSlotType]) -> ConcreteSlotType {
    resolve_dynamic_type(candidates, ConcreteSlotType::Scalar)
}

/// Resolve one concrete type from the types feeding a node's
/// dynamic-matrix slots. The fallback is [`ConcreteSlotType::Matrix2`].
pub fn resolve_dynamic_matrix_type(candidates: &[ConcreteSlotType]) -> ConcreteSlotType {
    resolve_dynamic_type(candidates, ConcreteSlotType::Matrix2)
}

fn resolve_dynamic_type(
    candidates: &[ConcreteSlotType],
    fallback: ConcreteSlotType,
) -> ConcreteSlotType {
    let mut first = None;
    let mut multiple = false;
    for &candidate in candidates {
        match first {
            None => first = Some(candidate),
            Some(f) if f != candidate => multiple = true,
            Some(_) => {}
        }
    }
    let Some(first) = first else {
        return fallback;
    };
    if !multiple {
        return first;
    }
    candidates
        .iter()
        .copied()
        .filter(|c| c.channel_count() != 1)
        .max()
        .unwrap_or(fallback)
}

/// Validates nodes in place.
///
/// Scratch buffers are kept across calls so repeated validation after
/// every edit does not reallocate; each buffer is cleared at the start
/// of a pass.
#[derive(Default)]
pub struct Validator {
    input_states: Vec<(SlotId, bool)>,
    vector_candidates: Vec<ConcreteSlotType>,
    matrix_candidates: Vec<ConcreteSlotType>,
    dynamic_vector_slots: Vec<SlotId>,
    dynamic_matrix_slots: Vec<SlotId>,
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_scratch(&mut self) {
        self.input_states.clear();
        self.vector_candidates.clear();
        self.matrix_candidates.clear();
        self.dynamic_vector_slots.clear();
        self.dynamic_matrix_slots.clear();
    }

    /// Validate one node against the current state of its upstream nodes.
    ///
    /// Recomputes input slot error flags, resolves dynamic slot types,
    /// propagates to outputs, applies the node type's custom error
    /// predicate and updates the node error flag and version counter. A
    /// missing node ID is a silent no-op. Upstream nodes are read as-is;
    /// use [`Validator::validate_graph`] to guarantee they are current.
    pub fn validate_node(&mut self, graph: &mut Graph, registry: &NodeRegistry, node_id: NodeId) {
        self.clear_scratch();

        let Some(node) = graph.node(node_id) else {
            return;
        };
        let check = registry.spec(&node.type_tag).and_then(|s| s.custom_error);

        // read-only pass over the inputs: gather per-slot error state and
        // the candidate types constraining each dynamic kind
        for slot in &node.inputs {
            match slot.kind {
                SlotKind::DynamicVector => self.dynamic_vector_slots.push(slot.id),
                SlotKind::DynamicMatrix => self.dynamic_matrix_slots.push(slot.id),
                SlotKind::Fixed => {}
            }

            let mut errored = false;
            if let Some((src_node, src_slot)) = graph.source_slot(SlotRef::new(node_id, slot.id)) {
                if src_node.has_error || src_slot.has_error {
                    errored = true;
                } else {
                    match slot.kind {
                        SlotKind::DynamicVector => {
                            self.vector_candidates.push(src_slot.concrete_type);
                        }
                        SlotKind::DynamicMatrix => {
                            self.matrix_candidates.push(src_slot.concrete_type);
                        }
                        SlotKind::Fixed => {
                            if !ConcreteSlotType::implicit_conversion_exists(
                                src_slot.concrete_type,
                                slot.concrete_type,
                            ) {
                                errored = true;
                            }
                        }
                    }
                }
            }
            self.input_states.push((slot.id, errored));
        }

        let vector_type = resolve_dynamic_vector_type(&self.vector_candidates);
        let matrix_type = resolve_dynamic_matrix_type(&self.matrix_candidates);

        // write the results back; unconnected dynamic inputs also pick up
        // the resolved type
        let Some(node) = graph.node_mut(node_id) else {
            return;
        };
        let mut input_error = false;
        for &(slot_id, errored) in &self.input_states {
            if let Some(slot) = node.find_slot_mut(slot_id) {
                slot.has_error = errored;
                input_error |= errored;
            }
        }
        for &slot_id in &self.dynamic_vector_slots {
            if let Some(slot) = node.find_slot_mut(slot_id) {
                slot.set_concrete_type(vector_type);
            }
        }
        for &slot_id in &self.dynamic_matrix_slots {
            if let Some(slot) = node.find_slot_mut(slot_id) {
                slot.set_concrete_type(matrix_type);
            }
        }

        // outputs inherit the input error state or adopt the resolved
        // dynamic type; fixed outputs keep their declared type
        let mut output_error = false;
        for slot in &mut node.outputs {
            slot.has_error = input_error;
            if input_error {
                output_error = true;
                continue;
            }
            match slot.kind {
                SlotKind::DynamicVector => slot.set_concrete_type(vector_type),
                SlotKind::DynamicMatrix => slot.set_concrete_type(matrix_type),
                SlotKind::Fixed => {}
            }
        }

        let custom_error = match check {
            Some(f) => graph.node(node_id).is_some_and(|n| f(graph, n)),
            None => false,
        };

        let Some(node) = graph.node_mut(node_id) else {
            return;
        };
        let has_error = input_error || output_error || custom_error;
        node.has_error = has_error;
        if !has_error {
            node.advance_version();
        }
        tracing::debug!(
            "validated node '{}': error={}, version={}",
            node.name,
            node.has_error,
            node.version()
        );
    }

    /// Validate every node, upstream before downstream.
    ///
    /// Fails only when the graph contains a cycle and no valid order
    /// exists; per-node outcomes are still reported through error flags.
    pub fn validate_graph(
        &mut self,
        graph: &mut Graph,
        registry: &NodeRegistry,
    ) -> Result<(), CycleError> {
        let order = graph.topological_order()?;
        for node_id in order {
            self.validate_node(graph, registry, node_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::registry::{NodeCategory, NodeSpec};
    use crate::slot::ConcreteSlotType as T;
    use crate::slot::Slot;

    fn registry() -> NodeRegistry {
        NodeRegistry::new()
    }

    fn constant(ty: T) -> Node {
        let mut node = Node::new("constant", "Constant");
        node.add_slot(Slot::output(0, "Out", ty));
        node
    }

    fn dynamic_add() -> Node {
        let mut node = Node::new("add", "Add");
        node.add_slot(Slot::dynamic_vector_input(0, "A"));
        node.add_slot(Slot::dynamic_vector_input(1, "B"));
        node.add_slot(Slot::dynamic_vector_output(2, "Out"));
        node
    }

    fn matrix_multiply() -> Node {
        let mut node = Node::new("matrix_multiply", "Matrix Multiply");
        node.add_slot(Slot::dynamic_matrix_input(0, "A"));
        node.add_slot(Slot::dynamic_matrix_input(1, "B"));
        node.add_slot(Slot::dynamic_matrix_output(2, "Out"));
        node
    }

    fn connect(graph: &mut Graph, from: NodeId, from_slot: u32, to: NodeId, to_slot: u32) {
        graph
            .connect(
                SlotRef::new(from, SlotId(from_slot)),
                SlotRef::new(to, SlotId(to_slot)),
            )
            .unwrap();
    }

    #[test]
    fn test_resolve_with_no_candidates_falls_back() {
        assert_eq!(resolve_dynamic_vector_type(&[]), T::Scalar);
        assert_eq!(resolve_dynamic_matrix_type(&[]), T::Matrix2);
    }

    #[test]
    fn test_resolve_single_candidate_wins() {
        assert_eq!(resolve_dynamic_vector_type(&[T::Vector3]), T::Vector3);
        assert_eq!(
            resolve_dynamic_vector_type(&[T::Vector2, T::Vector2]),
            T::Vector2
        );
        assert_eq!(resolve_dynamic_matrix_type(&[T::Matrix3]), T::Matrix3);
    }

    #[test]
    fn test_resolve_drops_scalar_then_takes_max() {
        assert_eq!(
            resolve_dynamic_vector_type(&[T::Scalar, T::Vector4]),
            T::Vector4
        );
        assert_eq!(
            resolve_dynamic_vector_type(&[T::Vector2, T::Vector3]),
            T::Vector3
        );
        assert_eq!(
            resolve_dynamic_vector_type(&[T::Scalar, T::Vector2, T::Vector4]),
            T::Vector4
        );
        assert_eq!(
            resolve_dynamic_matrix_type(&[T::Matrix2, T::Matrix4]),
            T::Matrix4
        );
    }

    #[test]
    fn test_unconnected_dynamic_inputs_resolve_to_scalar() {
        let mut graph = Graph::new("test");
        let add = graph.add_node(dynamic_add());

        Validator::new().validate_node(&mut graph, &registry(), add);

        let node = graph.node(add).unwrap();
        assert!(!node.has_error);
        assert_eq!(node.find_slot(SlotId(0)).unwrap().concrete_type, T::Scalar);
        assert_eq!(node.find_slot(SlotId(2)).unwrap().concrete_type, T::Scalar);
        assert_eq!(node.version(), 1);
    }

    #[test]
    fn test_scalar_and_vector4_resolve_to_vector4() {
        let mut graph = Graph::new("test");
        let s = graph.add_node(constant(T::Scalar));
        let v4 = graph.add_node(constant(T::Vector4));
        let add = graph.add_node(dynamic_add());
        connect(&mut graph, s, 0, add, 0);
        connect(&mut graph, v4, 0, add, 1);

        Validator::new()
            .validate_graph(&mut graph, &registry())
            .unwrap();

        let node = graph.node(add).unwrap();
        assert!(!node.has_error);
        for slot_id in [0, 1, 2] {
            assert_eq!(
                node.find_slot(SlotId(slot_id)).unwrap().concrete_type,
                T::Vector4
            );
        }
    }

    #[test]
    fn test_vector2_and_vector3_resolve_to_vector3() {
        let mut graph = Graph::new("test");
        let v2 = graph.add_node(constant(T::Vector2));
        let v3 = graph.add_node(constant(T::Vector3));
        let add = graph.add_node(dynamic_add());
        connect(&mut graph, v2, 0, add, 0);
        connect(&mut graph, v3, 0, add, 1);

        Validator::new()
            .validate_graph(&mut graph, &registry())
            .unwrap();

        assert_eq!(
            graph.node(add).unwrap().find_slot(SlotId(2)).unwrap().concrete_type,
            T::Vector3
        );
    }

    #[test]
    fn test_skipped_dynamic_input_receives_resolved_type() {
        let mut graph = Graph::new("test");
        let v3 = graph.add_node(constant(T::Vector3));
        let add = graph.add_node(dynamic_add());
        connect(&mut graph, v3, 0, add, 0);
        // slot 1 left unconnected

        Validator::new()
            .validate_graph(&mut graph, &registry())
            .unwrap();

        let node = graph.node(add).unwrap();
        assert_eq!(node.find_slot(SlotId(1)).unwrap().concrete_type, T::Vector3);
    }

    #[test]
    fn test_dynamic_matrix_resolution() {
        let mut graph = Graph::new("test");
        let m2 = graph.add_node(constant(T::Matrix2));
        let m4 = graph.add_node(constant(T::Matrix4));
        let mul = graph.add_node(matrix_multiply());
        connect(&mut graph, m2, 0, mul, 0);
        connect(&mut graph, m4, 0, mul, 1);

        Validator::new()
            .validate_graph(&mut graph, &registry())
            .unwrap();

        let node = graph.node(mul).unwrap();
        assert!(!node.has_error);
        assert_eq!(node.find_slot(SlotId(2)).unwrap().concrete_type, T::Matrix4);
    }

    #[test]
    fn test_fixed_input_type_mismatch_sets_error() {
        let mut graph = Graph::new("test");
        let tex = graph.add_node(constant(T::Texture));
        let mut sink = Node::new("power", "Power");
        sink.add_slot(Slot::input(0, "Base", T::Scalar));
        sink.add_slot(Slot::output(1, "Out", T::Scalar));
        let sink = graph.add_node(sink);
        connect(&mut graph, tex, 0, sink, 0);

        Validator::new()
            .validate_graph(&mut graph, &registry())
            .unwrap();

        let node = graph.node(sink).unwrap();
        assert!(node.find_slot(SlotId(0)).unwrap().has_error);
        assert!(node.find_slot(SlotId(1)).unwrap().has_error);
        assert!(node.has_error);
        assert_eq!(node.version(), 0);
    }

    #[test]
    fn test_vector_width_narrowing_is_permitted() {
        // the channel-count rule is symmetric: a four-wide output may
        // feed a scalar input
        let mut graph = Graph::new("test");
        let v4 = graph.add_node(constant(T::Vector4));
        let mut sink = Node::new("sine", "Sine");
        sink.add_slot(Slot::input(0, "In", T::Scalar));
        sink.add_slot(Slot::output(1, "Out", T::Scalar));
        let sink = graph.add_node(sink);
        connect(&mut graph, v4, 0, sink, 0);

        Validator::new()
            .validate_graph(&mut graph, &registry())
            .unwrap();

        assert!(!graph.node(sink).unwrap().has_error);
    }

    #[test]
    fn test_upstream_error_propagates_and_blocks_version() {
        let mut graph = Graph::new("test");
        let tex = graph.add_node(constant(T::Texture));
        let mut bad = Node::new("power", "Power");
        bad.add_slot(Slot::input(0, "Base", T::Scalar));
        bad.add_slot(Slot::output(1, "Out", T::Scalar));
        let bad = graph.add_node(bad);
        let downstream = graph.add_node(dynamic_add());
        connect(&mut graph, tex, 0, bad, 0);
        connect(&mut graph, bad, 1, downstream, 0);

        Validator::new()
            .validate_graph(&mut graph, &registry())
            .unwrap();

        assert!(graph.node(bad).unwrap().has_error);
        let node = graph.node(downstream).unwrap();
        assert!(node.find_slot(SlotId(0)).unwrap().has_error);
        assert!(node.has_error);
        assert_eq!(node.version(), 0);
    }

    #[test]
    fn test_version_advances_only_on_clean_passes() {
        let mut graph = Graph::new("test");
        let add = graph.add_node(dynamic_add());
        let mut validator = Validator::new();
        let reg = registry();

        validator.validate_node(&mut graph, &reg, add);
        validator.validate_node(&mut graph, &reg, add);
        assert_eq!(graph.node(add).unwrap().version(), 2);

        // introduce an upstream error and re-validate
        let tex = graph.add_node(constant(T::Texture));
        let mut bad = Node::new("power", "Power");
        bad.add_slot(Slot::input(0, "Base", T::Scalar));
        bad.add_slot(Slot::output(1, "Out", T::Scalar));
        let bad = graph.add_node(bad);
        connect(&mut graph, tex, 0, bad, 0);
        connect(&mut graph, bad, 1, add, 0);

        validator.validate_graph(&mut graph, &reg).unwrap();
        let node = graph.node(add).unwrap();
        assert!(node.has_error);
        assert_eq!(node.version(), 2);
    }

    #[test]
    fn test_error_recovery_resumes_version_advance() {
        let mut graph = Graph::new("test");
        let tex = graph.add_node(constant(T::Texture));
        let mut sink = Node::new("power", "Power");
        sink.add_slot(Slot::input(0, "Base", T::Scalar));
        sink.add_slot(Slot::output(1, "Out", T::Scalar));
        let sink = graph.add_node(sink);
        connect(&mut graph, tex, 0, sink, 0);

        let mut validator = Validator::new();
        let reg = registry();
        validator.validate_graph(&mut graph, &reg).unwrap();
        assert_eq!(graph.node(sink).unwrap().version(), 0);

        // removing the offending upstream node clears the mismatch
        graph.remove_node(tex);
        validator.validate_graph(&mut graph, &reg).unwrap();
        let node = graph.node(sink).unwrap();
        assert!(!node.has_error);
        assert_eq!(node.version(), 1);
    }

    #[test]
    fn test_custom_error_predicate_marks_node() {
        let mut reg = NodeRegistry::new();
        reg.register(
            NodeSpec::new("add", "Add", NodeCategory::Math, "Add two values")
                .with_input(Slot::dynamic_vector_input(0, "A"))
                .with_input(Slot::dynamic_vector_input(1, "B"))
                .with_output(Slot::dynamic_vector_output(2, "Out"))
                .with_custom_error(|graph, node| {
                    // errored unless both inputs are connected
                    !node
                        .inputs
                        .iter()
                        .all(|s| graph.is_slot_connected(node.slot_reference(s.id)))
                }),
        );

        let mut graph = Graph::new("test");
        let add = graph.add_node(reg.create_node("add").unwrap());
        let mut validator = Validator::new();

        validator.validate_node(&mut graph, &reg, add);
        assert!(graph.node(add).unwrap().has_error);
        assert_eq!(graph.node(add).unwrap().version(), 0);

        let a = graph.add_node(constant(T::Vector2));
        let b = graph.add_node(constant(T::Vector2));
        connect(&mut graph, a, 0, add, 0);
        connect(&mut graph, b, 0, add, 1);

        validator.validate_graph(&mut graph, &reg).unwrap();
        let node = graph.node(add).unwrap();
        assert!(!node.has_error);
        assert_eq!(node.version(), 1);
    }

    #[test]
    fn test_validator_scratch_is_reusable_across_nodes() {
        // one validator across a chain of nodes with different dynamic
        // resolutions must not leak candidates between passes
        let mut graph = Graph::new("test");
        let v4 = graph.add_node(constant(T::Vector4));
        let first = graph.add_node(dynamic_add());
        let second = graph.add_node(dynamic_add());
        connect(&mut graph, v4, 0, first, 0);
        // second is fully unconnected and must resolve to Scalar

        let mut validator = Validator::new();
        validator.validate_graph(&mut graph, &registry()).unwrap();

        assert_eq!(
            graph.node(first).unwrap().find_slot(SlotId(2)).unwrap().concrete_type,
            T::Vector4
        );
        assert_eq!(
            graph.node(second).unwrap().find_slot(SlotId(2)).unwrap().concrete_type,
            T::Scalar
        );
    }
}
