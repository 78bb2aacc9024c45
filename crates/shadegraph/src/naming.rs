// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader-safe identifier helpers for generated variable names.

use crate::node::NodeId;

/// Sanitize a display name into a shader-safe identifier.
///
/// Non-alphanumeric characters become underscores and a leading digit is
/// guarded with an underscore. An empty or all-invalid name falls back to
/// `node`.
pub fn shader_safe_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.chars().all(|c| c == '_') || out.is_empty() {
        return "node".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Compact identifier-safe encoding of a node ID.
pub fn encode_node_id(id: NodeId) -> String {
    id.0.simple().to_string()
}
