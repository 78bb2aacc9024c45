// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};

/// Identifier for a slot, unique within its owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

/// Slot direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotDirection {
    /// Input slot
    Input,
    /// Output slot
    Output,
}

/// Fully resolved value type of a slot.
///
/// The derived ordering is the promotion order used when resolving
/// dynamic slots: wider and higher-dimensional types sort greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConcreteSlotType {
    /// Boolean value
    Boolean,
    /// Texture sampler
    Texture,
    /// Single float
    Scalar,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector
    Vector4,
    /// 2x2 matrix
    Matrix2,
    /// 3x3 matrix
    Matrix3,
    /// 4x4 matrix
    Matrix4,
}

impl ConcreteSlotType {
    /// Number of float channels this type carries.
    ///
    /// Booleans, textures and matrices report zero channels; the
    /// implicit-conversion rule only promotes between channeled types.
    pub fn channel_count(&self) -> u32 {
        match self {
            Self::Scalar => 1,
            Self::Vector2 => 2,
            Self::Vector3 => 3,
            Self::Vector4 => 4,
            Self::Boolean | Self::Texture | Self::Matrix2 | Self::Matrix3 | Self::Matrix4 => 0,
        }
    }

    /// Check whether an implicit conversion exists between two types.
    ///
    /// Identical types always convert. Otherwise both types must carry a
    /// positive channel count; the rule is deliberately symmetric so a
    /// wider vector may feed a narrower slot and vice versa.
    pub fn implicit_conversion_exists(from: ConcreteSlotType, to: ConcreteSlotType) -> bool {
        if from == to {
            return true;
        }
        from.channel_count() > 0 && to.channel_count() > 0
    }

    /// Shader-facing type name (for generated variable declarations).
    pub fn shader_name(&self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Texture => "texture2d",
            Self::Scalar => "float",
            Self::Vector2 => "float2",
            Self::Vector3 => "float3",
            Self::Vector4 => "float4",
            Self::Matrix2 => "float2x2",
            Self::Matrix3 => "float3x3",
            Self::Matrix4 => "float4x4",
        }
    }
}

/// How a slot's concrete type is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Declared concrete type, fixed at definition time
    Fixed,
    /// Scalar/vector type resolved at validation time from connected slots
    DynamicVector,
    /// Matrix type resolved at validation time from connected slots
    DynamicMatrix,
}

impl SlotKind {
    /// Fallback concrete type used when nothing constrains a dynamic slot.
    pub fn default_type(&self) -> ConcreteSlotType {
        match self {
            Self::Fixed | Self::DynamicVector => ConcreteSlotType::Scalar,
            Self::DynamicMatrix => ConcreteSlotType::Matrix2,
        }
    }
}

/// Default value carried by an unconnected input slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SlotValue {
    /// Boolean
    Boolean(bool),
    /// Single float
    Scalar(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector
    Vector4([f32; 4]),
}

/// A typed input or output port on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot ID, unique within the owning node
    pub id: SlotId,
    /// Display name
    pub name: String,
    /// Name used when generating shader variable names
    pub shader_output_name: String,
    /// Slot direction
    pub direction: SlotDirection,
    /// Fixed or dynamically typed
    pub kind: SlotKind,
    /// Current concrete type; for dynamic slots this is rewritten by
    /// validation, for fixed slots it is the declared type
    pub concrete_type: ConcreteSlotType,
    /// Error flag set by validation
    pub has_error: bool,
    /// Default value (for inputs)
    pub default_value: Option<SlotValue>,
}

impl Slot {
    fn new(
        id: SlotId,
        name: impl Into<String>,
        direction: SlotDirection,
        kind: SlotKind,
        concrete_type: ConcreteSlotType,
    ) -> Self {
        let name = name.into();
        Self {
            id,
            shader_output_name: name.clone(),
            name,
            direction,
            kind,
            concrete_type,
            has_error: false,
            default_value: None,
        }
    }

    /// Create a fixed-type input slot.
    pub fn input(id: u32, name: impl Into<String>, concrete_type: ConcreteSlotType) -> Self {
        Self::new(SlotId(id), name, SlotDirection::Input, SlotKind::Fixed, concrete_type)
    }

    /// Create a fixed-type output slot.
    pub fn output(id: u32, name: impl Into<String>, concrete_type: ConcreteSlotType) -> Self {
        Self::new(SlotId(id), name, SlotDirection::Output, SlotKind::Fixed, concrete_type)
    }

    /// Create a dynamic-vector input slot, starting at the scalar default.
    pub fn dynamic_vector_input(id: u32, name: impl Into<String>) -> Self {
        let kind = SlotKind::DynamicVector;
        Self::new(SlotId(id), name, SlotDirection::Input, kind, kind.default_type())
    }

    /// Create a dynamic-vector output slot, starting at the scalar default.
    pub fn dynamic_vector_output(id: u32, name: impl Into<String>) -> Self {
        let kind = SlotKind::DynamicVector;
        Self::new(SlotId(id), name, SlotDirection::Output, kind, kind.default_type())
    }

    /// Create a dynamic-matrix input slot, starting at the 2x2 default.
    pub fn dynamic_matrix_input(id: u32, name: impl Into<String>) -> Self {
        let kind = SlotKind::DynamicMatrix;
        Self::new(SlotId(id), name, SlotDirection::Input, kind, kind.default_type())
    }

    /// Create a dynamic-matrix output slot, starting at the 2x2 default.
    pub fn dynamic_matrix_output(id: u32, name: impl Into<String>) -> Self {
        let kind = SlotKind::DynamicMatrix;
        Self::new(SlotId(id), name, SlotDirection::Output, kind, kind.default_type())
    }

    /// Set the default value.
    pub fn with_default(mut self, value: SlotValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Override the shader output name (defaults to the display name).
    pub fn with_shader_output_name(mut self, name: impl Into<String>) -> Self {
        self.shader_output_name = name.into();
        self
    }

    /// Whether this is an input slot.
    pub fn is_input(&self) -> bool {
        self.direction == SlotDirection::Input
    }

    /// Whether this is an output slot.
    pub fn is_output(&self) -> bool {
        self.direction == SlotDirection::Output
    }

    /// Whether this slot's type is resolved at validation time.
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, SlotKind::DynamicVector | SlotKind::DynamicMatrix)
    }

    /// Assign a resolved concrete type to a dynamic slot.
    ///
    /// No-op for fixed slots; their declared type never changes.
    pub fn set_concrete_type(&mut self, concrete_type: ConcreteSlotType) {
        if self.is_dynamic() {
            self.concrete_type = concrete_type;
        }
    }

    /// Carry user-edited state over from a previous revision of this slot.
    ///
    /// Used when a node re-declares its slots after a definition change:
    /// the fresh slot keeps its declared shape but inherits the old
    /// default value and, for dynamic slots of the same kind, the last
    /// resolved type.
    pub fn copy_values_from(&mut self, other: &Slot) {
        if other.default_value.is_some() {
            self.default_value = other.default_value.clone();
        }
        if self.is_dynamic() && self.kind == other.kind {
            self.concrete_type = other.concrete_type;
        }
    }
}
