//! Sidecar description of a compiled material: parameter values and texture bindings.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::compiler::error::MaterialCompileError;
use crate::compiler::registry::ExpressionKind;
use crate::compiler::{TargetTextureFormat, convert_source_format, resolve_overrides};
use crate::dsl::{MaterialInterface, find_texture, parse_f32, parse_str, parse_vec4};

/// Vertex shader every compiled material is paired with.
pub const SCENE_VERTEX_SHADER: &str = "shaders/scene_vs.hlsl";

/// Texture role, picked from a sample node's `samplerType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureSlot {
    Albedo,
    Normal,
    Unknown,
}

impl TextureSlot {
    pub fn from_sampler_type(sampler_type: &str) -> Self {
        match sampler_type {
            "Color" => TextureSlot::Albedo,
            "Normal" => TextureSlot::Normal,
            _ => TextureSlot::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureBinding {
    pub slot: TextureSlot,
    pub texture: String,
    pub format: TargetTextureFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialManifest {
    pub name: String,
    #[serde(rename = "vertexShader")]
    pub vertex_shader: String,
    #[serde(rename = "vectorParameters")]
    pub vector_parameters: BTreeMap<String, [f32; 4]>,
    #[serde(rename = "scalarParameters")]
    pub scalar_parameters: BTreeMap<String, f32>,
    pub textures: Vec<TextureBinding>,
}

impl MaterialManifest {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the manifest of `material`: parameter defaults of the base graph with the
/// instance overrides applied, and one binding per distinct sampled texture and slot.
pub fn build_material_manifest(material: &MaterialInterface) -> Result<MaterialManifest> {
    let base = material.base_material();
    let overrides = resolve_overrides(material);

    let mut vector_parameters = BTreeMap::new();
    let mut scalar_parameters = BTreeMap::new();
    let mut textures: Vec<TextureBinding> = Vec::new();

    for node in &base.nodes {
        let name = parse_str(&node.params, "parameterName").unwrap_or(node.id.as_str());
        match ExpressionKind::from_node_type(&node.node_type) {
            ExpressionKind::VectorParameter => {
                let value = overrides
                    .vector(name)
                    .or_else(|| parse_vec4(&node.params, "defaultValue"))
                    .unwrap_or([0.0, 0.0, 0.0, 1.0]);
                vector_parameters.insert(name.to_string(), value);
            }
            ExpressionKind::ScalarParameter => {
                let value = overrides
                    .scalar(name)
                    .or_else(|| parse_f32(&node.params, "defaultValue"))
                    .unwrap_or(0.0);
                scalar_parameters.insert(name.to_string(), value);
            }
            ExpressionKind::TextureSample => {
                let texture_name = parse_str(&node.params, "texture");
                let Some(texture) = texture_name.and_then(|t| find_texture(base, t)) else {
                    return Err(MaterialCompileError::MissingTexture {
                        node: node.id.clone(),
                        texture: texture_name.map(str::to_string),
                    }
                    .into());
                };
                let binding = TextureBinding {
                    slot: TextureSlot::from_sampler_type(
                        parse_str(&node.params, "samplerType").unwrap_or("Color"),
                    ),
                    texture: texture.name.clone(),
                    format: convert_source_format(texture)?,
                };
                if !textures.contains(&binding) {
                    textures.push(binding);
                }
            }
            _ => {}
        }
    }

    Ok(MaterialManifest {
        name: material.name().to_string(),
        vertex_shader: SCENE_VERTEX_SHADER.to_string(),
        vector_parameters,
        scalar_parameters,
        textures,
    })
}
