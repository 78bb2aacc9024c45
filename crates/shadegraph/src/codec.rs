// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph asset encoding and decoding.
//!
//! The on-disk document keeps each node as a type-tag discriminator plus
//! a JSON payload, and each edge as its four endpoint identifiers.
//! Encoding and decoding are explicit calls made by whoever owns the
//! asset; nothing here runs implicitly on load or save.

use crate::edge::SlotRef;
use crate::graph::{ConnectError, Graph};
use crate::node::{Node, NodeId};
use crate::registry::NodeRegistry;
use crate::slot::SlotId;
use serde::{Deserialize, Serialize};

/// Current graph document format version
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// One node in a graph document: discriminator plus payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedNode {
    /// Node type tag, resolved through the registry on decode
    pub node_type: String,
    /// Full node state as JSON
    pub payload: serde_json::Value,
}

/// One edge in a graph document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedEdge {
    /// Source node
    pub source_node: NodeId,
    /// Source output slot
    pub source_slot: SlotId,
    /// Target node
    pub target_node: NodeId,
    /// Target input slot
    pub target_slot: SlotId,
}

/// A serialized graph asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphData {
    /// Document format version
    pub version: u32,
    /// Graph name
    pub name: String,
    /// Serialized nodes
    pub nodes: Vec<SerializedNode>,
    /// Serialized edges
    pub edges: Vec<SerializedEdge>,
}

impl GraphData {
    /// Serialize to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Error when encoding a graph
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A node's state could not be represented as JSON
    #[error("Failed to encode node: {0}")]
    Node(#[from] serde_json::Error),
}

/// Error when decoding a graph document
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Document format version is not supported
    #[error("Unsupported graph format version: {0}")]
    UnsupportedVersion(u32),

    /// No registered node type matches the discriminator
    #[error("Unknown node type: '{0}'")]
    UnknownNodeType(String),

    /// A node payload did not deserialize
    #[error("Malformed payload for node type '{node_type}': {source}")]
    MalformedNode {
        /// Discriminator of the offending node
        node_type: String,
        /// Underlying deserialization error
        source: serde_json::Error,
    },
}

/// Encode a graph into a document.
pub fn encode_graph(graph: &Graph) -> Result<GraphData, EncodeError> {
    let mut nodes = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        nodes.push(SerializedNode {
            node_type: node.type_tag.clone(),
            payload: serde_json::to_value(node)?,
        });
    }

    let edges = graph
        .edges()
        .map(|edge| SerializedEdge {
            source_node: edge.from.node,
            source_slot: edge.from.slot,
            target_node: edge.to.node,
            target_slot: edge.to.slot,
        })
        .collect();

    Ok(GraphData {
        version: GRAPH_FORMAT_VERSION,
        name: graph.name.clone(),
        nodes,
        edges,
    })
}

/// Decode a document into a graph.
///
/// Every node's type tag must resolve through the registry; an unknown
/// tag or a malformed payload fails the whole decode. Edges whose
/// endpoints no longer exist (a stale asset edited by hand, or saved
/// against an older node definition) are skipped with a warning, the way
/// a graph editor tolerates partially stale assets. The decoded graph is
/// not re-validated; the caller decides when to run validation.
pub fn decode_graph(data: &GraphData, registry: &NodeRegistry) -> Result<Graph, DecodeError> {
    if data.version != GRAPH_FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(data.version));
    }

    let mut graph = Graph::new(data.name.clone());

    for serialized in &data.nodes {
        if !registry.contains(&serialized.node_type) {
            return Err(DecodeError::UnknownNodeType(serialized.node_type.clone()));
        }
        let node: Node =
            serde_json::from_value(serialized.payload.clone()).map_err(|source| {
                DecodeError::MalformedNode {
                    node_type: serialized.node_type.clone(),
                    source,
                }
            })?;
        graph.add_node(node);
    }

    for edge in &data.edges {
        let from = SlotRef::new(edge.source_node, edge.source_slot);
        let to = SlotRef::new(edge.target_node, edge.target_slot);
        if let Err(err) = graph.connect(from, to) {
            match err {
                ConnectError::NodeNotFound(_) | ConnectError::SlotNotFound(_) => {
                    tracing::warn!("Skipping stale edge {:?} -> {:?}: {}", from, to, err);
                }
                other => {
                    tracing::warn!("Skipping invalid edge {:?} -> {:?}: {}", from, to, other);
                }
            }
        }
    }

    Ok(graph)
}
