//! Material document model, loaders and param helpers.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::schema;

/// Node type of the distinguished output node whose inputs are the material's semantic slots.
pub const ROOT_NODE_TYPE: &str = "MaterialRoot";

/// A material as exported by the editor: either a base definition or an instance of one.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "kind")]
pub enum MaterialInterface {
    Material(MaterialDSL),
    Instance(MaterialInstanceDSL),
}

impl MaterialInterface {
    pub fn name(&self) -> &str {
        match self {
            MaterialInterface::Material(m) => &m.metadata.name,
            MaterialInterface::Instance(i) => &i.metadata.name,
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, MaterialInterface::Instance(_))
    }

    /// Walk up the parent chain to the base material that owns the graph.
    pub fn base_material(&self) -> &MaterialDSL {
        let mut current = self;
        loop {
            match current {
                MaterialInterface::Material(m) => return m,
                MaterialInterface::Instance(i) => current = &i.parent,
            }
        }
    }

    pub fn base_material_mut(&mut self) -> &mut MaterialDSL {
        match self {
            MaterialInterface::Material(m) => m,
            MaterialInterface::Instance(i) => i.parent.base_material_mut(),
        }
    }

    /// Instances from the one closest to the base material down to `self`.
    pub fn instance_chain(&self) -> Vec<&MaterialInstanceDSL> {
        let mut chain = Vec::new();
        let mut current = self;
        while let MaterialInterface::Instance(i) = current {
            chain.push(i);
            current = &i.parent;
        }
        chain.reverse();
        chain
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MaterialDSL {
    pub version: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub settings: MaterialSettings,
    #[serde(default)]
    pub defaults: MaterialDefaults,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub textures: Vec<TextureAsset>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MaterialInstanceDSL {
    pub metadata: Metadata,
    pub parent: Box<MaterialInterface>,
    #[serde(default, rename = "vectorParameterValues")]
    pub vector_parameter_values: Vec<VectorParameterValue>,
    #[serde(default, rename = "scalarParameterValues")]
    pub scalar_parameter_values: Vec<ScalarParameterValue>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VectorParameterValue {
    #[serde(rename = "parameterName")]
    pub parameter_name: String,
    pub value: [f32; 4],
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScalarParameterValue {
    #[serde(rename = "parameterName")]
    pub parameter_name: String,
    pub value: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Metadata {
    pub name: String,
    pub created: Option<String>,
    pub modified: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    Opaque,
    Masked,
    Translucent,
    Additive,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    #[default]
    DefaultLit,
    Unlit,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy)]
pub struct MaterialSettings {
    #[serde(default, rename = "blendMode")]
    pub blend_mode: BlendMode,
    #[serde(default, rename = "shadingModel")]
    pub shading_model: ShadingModel,
}

/// Material-level fallbacks for scalar outputs that are required but left unconnected.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy)]
pub struct MaterialDefaults {
    #[serde(default)]
    pub metallic: Option<f32>,
    #[serde(default)]
    pub specular: Option<f32>,
    #[serde(default)]
    pub roughness: Option<f32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TextureAsset {
    pub name: String,
    /// Source pixel format as reported by the editor (e.g. `BGRA8`).
    pub format: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Connection {
    pub id: String,
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Endpoint {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    #[serde(rename = "portId")]
    pub port_id: String,
}

pub fn load_material_from_path(path: impl AsRef<std::path::Path>) -> Result<MaterialInterface> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read material json at {}", path.display()))?;
    load_material_from_str(&text)
}

pub fn load_material_from_str(text: &str) -> Result<MaterialInterface> {
    let mut material: MaterialInterface =
        serde_json::from_str(text).context("failed to parse material json")?;

    // Hand-written documents may omit params; fill them from the bundled scheme.
    normalize_material_defaults(material.base_material_mut())?;

    Ok(material)
}

pub fn normalize_material_defaults(material: &mut MaterialDSL) -> Result<()> {
    let scheme = schema::load_default_scheme()?;
    apply_node_default_params(material, scheme);
    Ok(())
}

fn apply_node_default_params(material: &mut MaterialDSL, scheme: &schema::ExpressionScheme) {
    for node in &mut material.nodes {
        let Some(kind_scheme) = scheme.get(&node.node_type) else {
            continue;
        };
        if kind_scheme.default_params.is_empty() {
            continue;
        }

        let mut merged = kind_scheme.default_params.clone();
        for (k, v) in std::mem::take(&mut node.params) {
            merged.insert(k, v);
        }
        node.params = merged;
    }
}

pub fn find_node<'a>(material: &'a MaterialDSL, node_id: &str) -> Result<&'a Node> {
    material
        .nodes
        .iter()
        .find(|n| n.id == node_id)
        .ok_or_else(|| anyhow!("node not found: {node_id}"))
}

pub fn find_texture<'a>(material: &'a MaterialDSL, name: &str) -> Option<&'a TextureAsset> {
    material.textures.iter().find(|t| t.name == name)
}

pub fn parse_u32(params: &HashMap<String, serde_json::Value>, key: &str) -> Option<u32> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
}

pub fn parse_f32(params: &HashMap<String, serde_json::Value>, key: &str) -> Option<f32> {
    match params.get(key) {
        Some(v) => parse_json_number_f32(v),
        None => None,
    }
}

pub fn parse_str<'a>(params: &'a HashMap<String, serde_json::Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub fn parse_bool(params: &HashMap<String, serde_json::Value>, key: &str) -> Option<bool> {
    match params.get(key)? {
        serde_json::Value::Bool(b) => Some(*b),
        // The editor serialises channel toggles as 0/1 in older documents.
        v => v.as_u64().map(|x| x != 0),
    }
}

/// Parse an array param as a vec4; missing trailing components default to 0 (alpha to 1).
pub fn parse_vec4(params: &HashMap<String, serde_json::Value>, key: &str) -> Option<[f32; 4]> {
    let arr = params.get(key)?.as_array()?;
    let get = |i: usize, default: f32| -> f32 {
        arr.get(i)
            .and_then(parse_json_number_f32)
            .unwrap_or(default)
    };
    Some([get(0, 0.0), get(1, 0.0), get(2, 0.0), get(3, 1.0)])
}

fn parse_json_number_f32(v: &serde_json::Value) -> Option<f32> {
    v.as_f64()
        .map(|x| x as f32)
        .or_else(|| v.as_i64().map(|x| x as f32))
        .or_else(|| v.as_u64().map(|x| x as f32))
}
