// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of available node types.
//!
//! Serialized nodes carry a stable type-tag string; the registry maps
//! that tag to a node definition and factory. It is populated in code at
//! startup, so the set of constructible nodes is explicit rather than
//! discovered.

use crate::graph::Graph;
use crate::node::Node;
use crate::slot::Slot;
use indexmap::IndexMap;

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    /// Input nodes (constants, parameters)
    Input,
    /// Output nodes (result, preview)
    Output,
    /// Math operations
    Math,
    /// Matrix operations
    Matrix,
    /// Texture operations
    Texture,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    Custom,
}

/// Node-specific error predicate, consulted during validation.
///
/// Returns `true` when the node is in error for reasons beyond slot
/// type mismatches (for example a parameter combination the node cannot
/// generate code for).
pub type NodeCheck = fn(&Graph, &Node) -> bool;

/// Definition of one node type.
pub struct NodeSpec {
    /// Stable type tag, used as the serialization discriminator
    pub tag: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Input slot template
    pub inputs: Vec<Slot>,
    /// Output slot template
    pub outputs: Vec<Slot>,
    /// Optional node-specific error predicate
    pub custom_error: Option<NodeCheck>,
}

impl NodeSpec {
    /// Create a spec with no slots and no custom predicate.
    pub fn new(
        tag: impl Into<String>,
        name: impl Into<String>,
        category: NodeCategory,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            category,
            description: description.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            custom_error: None,
        }
    }

    /// Add an input slot to the template.
    pub fn with_input(mut self, slot: Slot) -> Self {
        self.inputs.push(slot);
        self
    }

    /// Add an output slot to the template.
    pub fn with_output(mut self, slot: Slot) -> Self {
        self.outputs.push(slot);
        self
    }

    /// Attach a node-specific error predicate.
    pub fn with_custom_error(mut self, check: NodeCheck) -> Self {
        self.custom_error = Some(check);
        self
    }

    /// Instantiate a fresh node from this definition.
    pub fn instantiate(&self) -> Node {
        let mut node = Node::new(self.tag.clone(), self.name.clone());
        for slot in &self.inputs {
            node.add_slot(slot.clone());
        }
        for slot in &self.outputs {
            node.add_slot(slot.clone());
        }
        node
    }
}

/// Registry of available node types, keyed by type tag.
pub struct NodeRegistry {
    specs: IndexMap<String, NodeSpec>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            specs: IndexMap::new(),
        }
    }

    /// Register a node type, replacing any previous spec with the same tag
    pub fn register(&mut self, spec: NodeSpec) {
        self.specs.insert(spec.tag.clone(), spec);
    }

    /// Get a node spec by tag
    pub fn spec(&self, tag: &str) -> Option<&NodeSpec> {
        self.specs.get(tag)
    }

    /// Whether a tag is registered
    pub fn contains(&self, tag: &str) -> bool {
        self.specs.contains_key(tag)
    }

    /// Get all registered specs
    pub fn specs(&self) -> impl Iterator<Item = &NodeSpec> {
        self.specs.values()
    }

    /// Get specs in a category
    pub fn specs_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeSpec> {
        self.specs.values().filter(move |s| s.category == category)
    }

    /// Create a node from a type tag
    pub fn create_node(&self, tag: &str) -> Option<Node> {
        self.spec(tag).map(NodeSpec::instantiate)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
