// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph core for shader authoring.
//!
//! This crate provides the data model and validation engine behind a
//! shader-graph-style authoring tool:
//! - Nodes with typed input/output slots
//! - Directed edges with connection validation
//! - Dynamic slot type resolution (scalar/vector/matrix promotion)
//! - An explicit node-type registry keyed by stable type tags
//! - Graph asset encoding/decoding
//!
//! ## Architecture
//!
//! The [`Graph`] owns nodes and edges; the editing surface mutates
//! topology through it. The [`Validator`](validate::Validator) walks the
//! graph after edits, resolving concrete types for dynamically-typed
//! slots and flagging type mismatches as per-slot and per-node error
//! state. A node's version counter advances only on clean validation
//! passes, giving consumers a cheap staleness signal.

pub mod codec;
pub mod edge;
pub mod graph;
pub mod library;
pub mod naming;
pub mod node;
pub mod registry;
pub mod slot;
pub mod validate;

pub use edge::{Edge, EdgeId, SlotRef};
pub use graph::{ConnectError, CycleError, Graph};
pub use node::{Node, NodeId};
pub use registry::{NodeCategory, NodeRegistry, NodeSpec};
pub use slot::{ConcreteSlotType, Slot, SlotDirection, SlotId, SlotKind, SlotValue};
pub use validate::Validator;
