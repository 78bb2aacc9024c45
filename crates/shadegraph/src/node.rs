// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::edge::SlotRef;
use crate::naming;
use crate::slot::{Slot, SlotId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A node instance in the graph.
///
/// Slot error flags, the node error flag and the version counter are
/// owned by validation; everything else is edited by the authoring
/// surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Stable node-type tag, resolved through the registry
    pub type_tag: String,
    /// Display name (can be customized)
    pub name: String,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Input slots, in declaration order
    pub inputs: Vec<Slot>,
    /// Output slots, in declaration order
    pub outputs: Vec<Slot>,
    /// Error flag set by validation
    pub has_error: bool,
    version: u64,
}

impl Node {
    /// Create a new empty node with the given type tag and display name.
    pub fn new(type_tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            type_tag: type_tag.into(),
            name: name.into(),
            position: [0.0, 0.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
            has_error: false,
            version: 0,
        }
    }

    /// Set the position.
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Validation pass counter.
    ///
    /// Increments only on a validation pass that ends with zero errors;
    /// consumers compare it against a remembered value to detect stale
    /// downstream state.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn advance_version(&mut self) {
        self.version += 1;
    }

    /// Add a slot, replacing any existing slot with the same ID.
    ///
    /// Replacing keeps the old slot's user-edited state (default value,
    /// last resolved dynamic type) so that re-declaring a node's slots
    /// does not discard edits.
    pub fn add_slot(&mut self, mut slot: Slot) {
        let old = self.take_slot(slot.id);
        if let Some(old) = &old {
            slot.copy_values_from(old);
        }
        if slot.is_input() {
            self.inputs.push(slot);
        } else {
            self.outputs.push(slot);
        }
    }

    fn take_slot(&mut self, slot_id: SlotId) -> Option<Slot> {
        if let Some(pos) = self.inputs.iter().position(|s| s.id == slot_id) {
            return Some(self.inputs.remove(pos));
        }
        if let Some(pos) = self.outputs.iter().position(|s| s.id == slot_id) {
            return Some(self.outputs.remove(pos));
        }
        None
    }

    /// Remove a slot.
    ///
    /// Edges using the slot are owned by the graph; use
    /// [`Graph::remove_slot`](crate::graph::Graph::remove_slot) to drop
    /// them together.
    pub fn remove_slot(&mut self, slot_id: SlotId) -> Option<Slot> {
        self.take_slot(slot_id)
    }

    /// Remove every slot whose ID is not in `keep`, warning per removal.
    ///
    /// Used after a node definition changes shape and stale slots may
    /// linger in serialized data.
    pub fn remove_slots_not_in(&mut self, keep: &[SlotId]) {
        let stale: Vec<SlotId> = self
            .slots()
            .map(|s| s.id)
            .filter(|id| !keep.contains(id))
            .collect();
        for slot_id in stale {
            tracing::warn!("Removing stale slot {:?} from node '{}'", slot_id, self.name);
            self.take_slot(slot_id);
        }
    }

    /// Get a slot by ID.
    pub fn find_slot(&self, slot_id: SlotId) -> Option<&Slot> {
        self.slots().find(|s| s.id == slot_id)
    }

    /// Get a mutable slot by ID.
    pub fn find_slot_mut(&mut self, slot_id: SlotId) -> Option<&mut Slot> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|s| s.id == slot_id)
    }

    /// Get an input slot by ID.
    pub fn find_input_slot(&self, slot_id: SlotId) -> Option<&Slot> {
        self.inputs.iter().find(|s| s.id == slot_id)
    }

    /// Get an output slot by ID.
    pub fn find_output_slot(&self, slot_id: SlotId) -> Option<&Slot> {
        self.outputs.iter().find(|s| s.id == slot_id)
    }

    /// Iterate over all slots, inputs first.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Build a graph-wide reference to one of this node's slots.
    ///
    /// # Panics
    ///
    /// Panics if the slot ID does not exist on this node; asking for a
    /// reference to a missing slot is a caller bug, not a data state.
    pub fn slot_reference(&self, slot_id: SlotId) -> SlotRef {
        assert!(
            self.find_slot(slot_id).is_some(),
            "slot {slot_id:?} not found on node '{}' ({})",
            self.name,
            self.type_tag,
        );
        SlotRef::new(self.id, slot_id)
    }

    /// Shader variable name for this node: sanitized display name plus a
    /// compact encoding of the node ID.
    pub fn variable_name(&self) -> String {
        format!(
            "{}_{}",
            naming::shader_safe_name(&self.name),
            naming::encode_node_id(self.id)
        )
    }

    /// Shader variable name for one of this node's slots.
    ///
    /// # Panics
    ///
    /// Panics if the slot ID does not exist on this node.
    pub fn variable_name_for_slot(&self, slot_id: SlotId) -> String {
        let Some(slot) = self.find_slot(slot_id) else {
            panic!(
                "slot {slot_id:?} not found on node '{}' ({}) when building a variable name",
                self.name, self.type_tag,
            );
        };
        format!(
            "_{}_{}",
            self.variable_name(),
            naming::shader_safe_name(&slot.shader_output_name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{ConcreteSlotType, SlotValue};

    fn lerp_node() -> Node {
        let mut node = Node::new("lerp", "Lerp");
        node.add_slot(Slot::dynamic_vector_input(0, "A"));
        node.add_slot(Slot::dynamic_vector_input(1, "B"));
        node.add_slot(
            Slot::input(2, "T", ConcreteSlotType::Scalar).with_default(SlotValue::Scalar(0.5)),
        );
        node.add_slot(Slot::dynamic_vector_output(3, "Out"));
        node
    }

    #[test]
    fn test_slot_lookup() {
        let node = lerp_node();
        assert_eq!(node.inputs.len(), 3);
        assert_eq!(node.outputs.len(), 1);
        assert!(node.find_input_slot(SlotId(1)).is_some());
        assert!(node.find_output_slot(SlotId(1)).is_none());
        assert!(node.find_slot(SlotId(3)).is_some());
        assert!(node.find_slot(SlotId(9)).is_none());
    }

    #[test]
    fn test_add_slot_replaces_and_keeps_values() {
        let mut node = lerp_node();
        node.find_slot_mut(SlotId(0))
            .unwrap()
            .set_concrete_type(ConcreteSlotType::Vector3);

        // re-declare slot 0, as a definition refresh would
        node.add_slot(Slot::dynamic_vector_input(0, "A"));
        assert_eq!(node.inputs.iter().filter(|s| s.id == SlotId(0)).count(), 1);
        assert_eq!(
            node.find_slot(SlotId(0)).unwrap().concrete_type,
            ConcreteSlotType::Vector3
        );
    }

    #[test]
    fn test_remove_slots_not_in() {
        let mut node = lerp_node();
        node.remove_slots_not_in(&[SlotId(0), SlotId(3)]);
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.outputs.len(), 1);
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn test_slot_reference_panics_on_missing_slot() {
        let node = lerp_node();
        let _ = node.slot_reference(SlotId(42));
    }

    #[test]
    #[should_panic(expected = "variable name")]
    fn test_variable_name_panics_on_missing_slot() {
        let node = lerp_node();
        let _ = node.variable_name_for_slot(SlotId(42));
    }
}
