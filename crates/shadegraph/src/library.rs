// SPDX-License-Identifier: MIT OR Apache-2.0
//! Standard node library for shader graphs.

use crate::registry::{NodeCategory, NodeRegistry, NodeSpec};
use crate::slot::{ConcreteSlotType, Slot, SlotId, SlotValue};

/// Create the standard shader-graph node registry.
pub fn standard_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Output Nodes
    // ========================================================================

    registry.register(
        NodeSpec::new("surface_output", "Surface Output", NodeCategory::Output,
            "Final surface color and opacity")
            .with_input(
                Slot::input(0, "Color", ConcreteSlotType::Vector3)
                    .with_default(SlotValue::Vector3([0.8, 0.8, 0.8])),
            )
            .with_input(
                Slot::input(1, "Alpha", ConcreteSlotType::Scalar)
                    .with_default(SlotValue::Scalar(1.0)),
            ),
    );

    // ========================================================================
    // Input Nodes - Constants
    // ========================================================================

    registry.register(
        NodeSpec::new("scalar", "Scalar", NodeCategory::Input, "Constant float value")
            .with_output(Slot::output(0, "Out", ConcreteSlotType::Scalar)),
    );

    registry.register(
        NodeSpec::new("vector2", "Vector2", NodeCategory::Input, "Constant 2D vector")
            .with_output(Slot::output(0, "Out", ConcreteSlotType::Vector2)),
    );

    registry.register(
        NodeSpec::new("vector3", "Vector3", NodeCategory::Input, "Constant 3D vector")
            .with_output(Slot::output(0, "Out", ConcreteSlotType::Vector3)),
    );

    registry.register(
        NodeSpec::new("vector4", "Vector4", NodeCategory::Input, "Constant 4D vector")
            .with_output(Slot::output(0, "Out", ConcreteSlotType::Vector4)),
    );

    registry.register(
        NodeSpec::new("uv", "UV Coordinates", NodeCategory::Input, "Mesh UV coordinates")
            .with_output(Slot::output(0, "UV", ConcreteSlotType::Vector2)),
    );

    registry.register(
        NodeSpec::new("time", "Time", NodeCategory::Input, "Shader time in seconds")
            .with_output(Slot::output(0, "Time", ConcreteSlotType::Scalar)),
    );

    // ========================================================================
    // Math Nodes - dynamic width, resolved from connections
    // ========================================================================

    registry.register(binary_math("add", "Add", "Add two values"));
    registry.register(binary_math("subtract", "Subtract", "Subtract B from A"));
    registry.register(binary_math("multiply", "Multiply", "Multiply two values"));
    registry.register(binary_math("divide", "Divide", "Divide A by B"));
    registry.register(binary_math("minimum", "Minimum", "Minimum of two values"));
    registry.register(binary_math("maximum", "Maximum", "Maximum of two values"));
    registry.register(unary_math("negate", "Negate", "Negate value (-x)"));
    registry.register(unary_math("absolute", "Absolute", "Absolute value"));
    registry.register(unary_math("fract", "Fraction", "Fractional part of value"));
    registry.register(unary_math("saturate", "Saturate", "Clamp value between 0 and 1"));

    registry.register(
        NodeSpec::new("lerp", "Lerp", NodeCategory::Math,
            "Linear interpolation between A and B")
            .with_input(Slot::dynamic_vector_input(0, "A"))
            .with_input(Slot::dynamic_vector_input(1, "B"))
            .with_input(
                Slot::input(2, "T", ConcreteSlotType::Scalar)
                    .with_default(SlotValue::Scalar(0.5)),
            )
            .with_output(Slot::dynamic_vector_output(3, "Out")),
    );

    // ========================================================================
    // Vector Operations - fixed widths
    // ========================================================================

    registry.register(
        NodeSpec::new("dot", "Dot Product", NodeCategory::Math, "Dot product of two vectors")
            .with_input(Slot::input(0, "A", ConcreteSlotType::Vector3))
            .with_input(Slot::input(1, "B", ConcreteSlotType::Vector3))
            .with_output(Slot::output(2, "Out", ConcreteSlotType::Scalar)),
    );

    registry.register(
        NodeSpec::new("cross", "Cross Product", NodeCategory::Math,
            "Cross product of two 3D vectors")
            .with_input(Slot::input(0, "A", ConcreteSlotType::Vector3))
            .with_input(Slot::input(1, "B", ConcreteSlotType::Vector3))
            .with_output(Slot::output(2, "Out", ConcreteSlotType::Vector3)),
    );

    registry.register(
        NodeSpec::new("normalize", "Normalize", NodeCategory::Math,
            "Normalize vector to unit length")
            .with_input(Slot::dynamic_vector_input(0, "In"))
            .with_output(Slot::dynamic_vector_output(1, "Out")),
    );

    registry.register(
        NodeSpec::new("length", "Length", NodeCategory::Math, "Length of vector")
            .with_input(Slot::dynamic_vector_input(0, "In"))
            .with_output(Slot::output(1, "Out", ConcreteSlotType::Scalar)),
    );

    // ========================================================================
    // Matrix Operations
    // ========================================================================

    registry.register(
        NodeSpec::new("matrix2", "Matrix2", NodeCategory::Matrix, "Constant 2x2 matrix")
            .with_output(Slot::output(0, "Out", ConcreteSlotType::Matrix2)),
    );

    registry.register(
        NodeSpec::new("matrix3", "Matrix3", NodeCategory::Matrix, "Constant 3x3 matrix")
            .with_output(Slot::output(0, "Out", ConcreteSlotType::Matrix3)),
    );

    registry.register(
        NodeSpec::new("matrix4", "Matrix4", NodeCategory::Matrix, "Constant 4x4 matrix")
            .with_output(Slot::output(0, "Out", ConcreteSlotType::Matrix4)),
    );

    registry.register(
        NodeSpec::new("matrix_multiply", "Matrix Multiply", NodeCategory::Matrix,
            "Multiply two matrices")
            .with_input(Slot::dynamic_matrix_input(0, "A"))
            .with_input(Slot::dynamic_matrix_input(1, "B"))
            .with_output(Slot::dynamic_matrix_output(2, "Out")),
    );

    registry.register(
        NodeSpec::new("matrix_transpose", "Matrix Transpose", NodeCategory::Matrix,
            "Transpose a matrix")
            .with_input(Slot::dynamic_matrix_input(0, "In"))
            .with_output(Slot::dynamic_matrix_output(1, "Out")),
    );

    // ========================================================================
    // Texture Nodes
    // ========================================================================

    registry.register(
        NodeSpec::new("texture_sample", "Texture Sample", NodeCategory::Texture,
            "Sample a 2D texture")
            .with_input(Slot::input(0, "Texture", ConcreteSlotType::Texture))
            .with_input(Slot::input(1, "UV", ConcreteSlotType::Vector2))
            .with_output(Slot::output(2, "RGBA", ConcreteSlotType::Vector4))
            .with_output(Slot::output(3, "R", ConcreteSlotType::Scalar))
            .with_output(Slot::output(4, "G", ConcreteSlotType::Scalar))
            .with_output(Slot::output(5, "B", ConcreteSlotType::Scalar))
            .with_output(Slot::output(6, "A", ConcreteSlotType::Scalar))
            // no default exists for a texture; the input must be wired
            .with_custom_error(|graph, node| {
                !graph.is_slot_connected(node.slot_reference(SlotId(0)))
            }),
    );

    // ========================================================================
    // Utility Nodes
    // ========================================================================

    registry.register(
        NodeSpec::new("split", "Split", NodeCategory::Utility, "Split vector into components")
            .with_input(Slot::dynamic_vector_input(0, "In"))
            .with_output(Slot::output(1, "R", ConcreteSlotType::Scalar))
            .with_output(Slot::output(2, "G", ConcreteSlotType::Scalar))
            .with_output(Slot::output(3, "B", ConcreteSlotType::Scalar))
            .with_output(Slot::output(4, "A", ConcreteSlotType::Scalar)),
    );

    registry.register(
        NodeSpec::new("combine", "Combine", NodeCategory::Utility,
            "Combine components into a vector")
            .with_input(
                Slot::input(0, "R", ConcreteSlotType::Scalar)
                    .with_default(SlotValue::Scalar(0.0)),
            )
            .with_input(
                Slot::input(1, "G", ConcreteSlotType::Scalar)
                    .with_default(SlotValue::Scalar(0.0)),
            )
            .with_input(
                Slot::input(2, "B", ConcreteSlotType::Scalar)
                    .with_default(SlotValue::Scalar(0.0)),
            )
            .with_input(
                Slot::input(3, "A", ConcreteSlotType::Scalar)
                    .with_default(SlotValue::Scalar(1.0)),
            )
            .with_output(Slot::output(4, "Out", ConcreteSlotType::Vector4)),
    );

    registry
}

fn binary_math(tag: &str, name: &str, description: &str) -> NodeSpec {
    NodeSpec::new(tag, name, NodeCategory::Math, description)
        .with_input(Slot::dynamic_vector_input(0, "A"))
        .with_input(Slot::dynamic_vector_input(1, "B"))
        .with_output(Slot::dynamic_vector_output(2, "Out"))
}

fn unary_math(tag: &str, name: &str, description: &str) -> NodeSpec {
    NodeSpec::new(tag, name, NodeCategory::Math, description)
        .with_input(Slot::dynamic_vector_input(0, "In"))
        .with_output(Slot::dynamic_vector_output(1, "Out"))
}
