//! Core type definitions for the material compiler.

use std::collections::BTreeMap;

use crate::dsl::{BlendMode, MaterialSettings, ShadingModel};

use super::bindings::ResourceBindingCache;
use super::overrides::OverrideTable;

/// HLSL value type of a semantic slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Float1,
    Float2,
    Float3,
    Float4,
}

impl ValueType {
    /// Returns the half-precision HLSL type name for this value type.
    pub fn hlsl(self) -> &'static str {
        match self {
            ValueType::Float1 => "half",
            ValueType::Float2 => "half2",
            ValueType::Float3 => "half3",
            ValueType::Float4 => "half4",
        }
    }

    pub fn components(self) -> usize {
        match self {
            ValueType::Float1 => 1,
            ValueType::Float2 => 2,
            ValueType::Float3 => 3,
            ValueType::Float4 => 4,
        }
    }
}

/// Sub-component of an expression picked by the output pin a link starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ComponentSelector {
    #[default]
    Whole,
    Rgb,
    R,
    G,
    B,
    A,
}

impl ComponentSelector {
    pub fn from_pin_name(name: &str) -> Self {
        match name {
            "R" => ComponentSelector::R,
            "G" => ComponentSelector::G,
            "B" => ComponentSelector::B,
            "A" => ComponentSelector::A,
            "RGB" => ComponentSelector::Rgb,
            _ => ComponentSelector::Whole,
        }
    }

    /// HLSL swizzle suffix, empty for the whole value.
    pub fn swizzle(self) -> &'static str {
        match self {
            ComponentSelector::Whole => "",
            ComponentSelector::Rgb => ".rgb",
            ComponentSelector::R => ".r",
            ComponentSelector::G => ".g",
            ComponentSelector::B => ".b",
            ComponentSelector::A => ".a",
        }
    }

    /// Index of a single selected channel.
    pub fn channel(self) -> Option<usize> {
        match self {
            ComponentSelector::R => Some(0),
            ComponentSelector::G => Some(1),
            ComponentSelector::B => Some(2),
            ComponentSelector::A => Some(3),
            ComponentSelector::Whole | ComponentSelector::Rgb => None,
        }
    }
}

/// Semantic input slots of the material root node, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaterialProperty {
    BaseColor,
    Metallic,
    Specular,
    Roughness,
    EmissiveColor,
    Opacity,
    OpacityMask,
    Normal,
    WorldPositionOffset,
    AmbientOcclusion,
}

impl MaterialProperty {
    pub const ALL: [MaterialProperty; 10] = [
        MaterialProperty::BaseColor,
        MaterialProperty::Metallic,
        MaterialProperty::Specular,
        MaterialProperty::Roughness,
        MaterialProperty::EmissiveColor,
        MaterialProperty::Opacity,
        MaterialProperty::OpacityMask,
        MaterialProperty::Normal,
        MaterialProperty::WorldPositionOffset,
        MaterialProperty::AmbientOcclusion,
    ];

    /// Slots the lighting code downstream reads unconditionally.
    pub const REQUIRED: [MaterialProperty; 5] = [
        MaterialProperty::BaseColor,
        MaterialProperty::Metallic,
        MaterialProperty::Specular,
        MaterialProperty::Roughness,
        MaterialProperty::EmissiveColor,
    ];

    /// Port id used by connections into the root node.
    pub fn id(self) -> &'static str {
        match self {
            MaterialProperty::BaseColor => "BaseColor",
            MaterialProperty::Metallic => "Metallic",
            MaterialProperty::Specular => "Specular",
            MaterialProperty::Roughness => "Roughness",
            MaterialProperty::EmissiveColor => "EmissiveColor",
            MaterialProperty::Opacity => "Opacity",
            MaterialProperty::OpacityMask => "OpacityMask",
            MaterialProperty::Normal => "Normal",
            MaterialProperty::WorldPositionOffset => "WorldPositionOffset",
            MaterialProperty::AmbientOcclusion => "AmbientOcclusion",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MaterialProperty::BaseColor => "Base Color",
            MaterialProperty::Metallic => "Metallic",
            MaterialProperty::Specular => "Specular",
            MaterialProperty::Roughness => "Roughness",
            MaterialProperty::EmissiveColor => "Emissive Color",
            MaterialProperty::Opacity => "Opacity",
            MaterialProperty::OpacityMask => "Opacity Mask",
            MaterialProperty::Normal => "Normal",
            MaterialProperty::WorldPositionOffset => "World Position Offset",
            MaterialProperty::AmbientOcclusion => "Ambient Occlusion",
        }
    }

    /// Name of the local the slot is assigned to in the pixel shader body.
    pub fn variable_name(self) -> String {
        self.display_name().replace(' ', "_")
    }

    pub fn value_type(self) -> ValueType {
        match self {
            MaterialProperty::BaseColor
            | MaterialProperty::EmissiveColor
            | MaterialProperty::Normal
            | MaterialProperty::WorldPositionOffset => ValueType::Float3,
            MaterialProperty::Metallic
            | MaterialProperty::Specular
            | MaterialProperty::Roughness
            | MaterialProperty::Opacity
            | MaterialProperty::OpacityMask
            | MaterialProperty::AmbientOcclusion => ValueType::Float1,
        }
    }

    /// Preprocessor symbol defined when this slot is connected.
    pub fn macro_name(self) -> Option<&'static str> {
        match self {
            MaterialProperty::Normal => Some("HAS_NORMALMAP"),
            _ => None,
        }
    }

    /// Whether the editor shows this slot for the given material settings.
    pub fn is_visible(self, settings: &MaterialSettings) -> bool {
        let translucent = matches!(
            settings.blend_mode,
            BlendMode::Translucent | BlendMode::Additive
        );
        match self {
            MaterialProperty::Opacity => translucent,
            MaterialProperty::OpacityMask => settings.blend_mode == BlendMode::Masked,
            MaterialProperty::EmissiveColor | MaterialProperty::WorldPositionOffset => true,
            _ => settings.shading_model != ShadingModel::Unlit,
        }
    }
}

/// Per-compile state shared by every codegen rule. Reset at the start of each compile.
#[derive(Default, Debug)]
pub struct MaterialCompileContext {
    pub overrides: OverrideTable,
    pub bindings: ResourceBindingCache,
    /// Macros toggled on by connected slots, keyed by the slot that enabled them.
    pub macros: BTreeMap<MaterialProperty, &'static str>,
}

impl MaterialCompileContext {
    pub fn reset(&mut self) {
        self.overrides.clear();
        self.bindings.clear();
        self.macros.clear();
    }
}
