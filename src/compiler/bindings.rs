//! Resource binding cache: texture declarations, local definitions and the identifiers they use.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::error::MaterialCompileError;
use super::hlsl::is_reserved_identifier;
use super::utils::sanitize_hlsl_ident;
use crate::dsl::TextureAsset;

/// Deduplicated declarations collected while walking one material graph.
///
/// Both lists keep first-seen order so that the assembled shader text is stable
/// across compiles of the same graph.
#[derive(Debug, Default, Clone)]
pub struct ResourceBindingCache {
    /// Texture name -> declaration, in binding order.
    bound_resources: Vec<(String, String)>,
    resource_index: HashMap<String, usize>,
    /// Local variable -> declaration, in definition order.
    definitions: Vec<(String, String)>,
    definition_index: HashMap<String, usize>,
    /// Texture name -> shader variable.
    texture_vars: HashMap<String, String>,
    /// (prefix, node id) -> shader local.
    local_vars: HashMap<(String, String), String>,
    /// Every identifier handed out this compile.
    taken: HashSet<String>,
}

impl ResourceBindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.bound_resources.clear();
        self.resource_index.clear();
        self.definitions.clear();
        self.definition_index.clear();
        self.texture_vars.clear();
        self.local_vars.clear();
        self.taken.clear();
    }

    /// Claim `base`, or `base_1`, `base_2`, ... if it is reserved or already handed out.
    fn allocate(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 0;
        while is_reserved_identifier(&candidate) || self.taken.contains(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    /// Shader variable for `texture`. Distinct textures always get distinct variables, even
    /// when their names sanitize to the same identifier.
    pub fn texture_var(&mut self, texture: &str) -> String {
        if let Some(var) = self.texture_vars.get(texture) {
            return var.clone();
        }
        let var = self.allocate(sanitize_hlsl_ident(texture));
        self.texture_vars.insert(texture.to_string(), var.clone());
        var
    }

    /// Shader local holding a value node `node_id` defines, named `_<prefix>_<node>`.
    /// Stable for the same node within one compile and unique across nodes.
    pub fn local_var(&mut self, prefix: &str, node_id: &str) -> String {
        let key = (prefix.to_string(), node_id.to_string());
        if let Some(var) = self.local_vars.get(&key) {
            return var.clone();
        }
        let ident = sanitize_hlsl_ident(node_id);
        let base = format!("_{prefix}_{}", ident.trim_start_matches('_'));
        let var = self.allocate(base);
        self.local_vars.insert(key, var.clone());
        var
    }

    /// Bind a texture declaration. Returns false if the texture was already bound,
    /// in which case the existing declaration is kept.
    pub fn bind_resource(&mut self, texture: &str, declaration: impl Into<String>) -> bool {
        if self.resource_index.contains_key(texture) {
            return false;
        }
        self.resource_index
            .insert(texture.to_string(), self.bound_resources.len());
        self.bound_resources
            .push((texture.to_string(), declaration.into()));
        true
    }

    /// Register the declaration of local `var`. First definition wins.
    pub fn define(&mut self, var: &str, declaration: impl Into<String>) -> bool {
        if self.definition_index.contains_key(var) {
            return false;
        }
        self.definition_index
            .insert(var.to_string(), self.definitions.len());
        self.definitions.push((var.to_string(), declaration.into()));
        true
    }

    pub fn has_definition(&self, var: &str) -> bool {
        self.definition_index.contains_key(var)
    }

    pub fn definition(&self, var: &str) -> Option<&str> {
        self.definition_index
            .get(var)
            .map(|&i| self.definitions[i].1.as_str())
    }

    /// Texture declarations in binding order.
    pub fn bound_resources(&self) -> impl Iterator<Item = &str> {
        self.bound_resources.iter().map(|(_, decl)| decl.as_str())
    }

    /// Local definitions in first-seen order.
    pub fn definitions(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|(_, decl)| decl.as_str())
    }

    pub fn resource_count(&self) -> usize {
        self.bound_resources.len()
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }
}

/// GPU format a texture is uploaded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TargetTextureFormat {
    #[serde(rename = "DXGI_FORMAT_R8_UNORM")]
    R8Unorm,
    #[serde(rename = "DXGI_FORMAT_B8G8R8A8_UNORM")]
    B8G8R8A8Unorm,
    #[serde(rename = "DXGI_FORMAT_R16G16B16A16_UNORM")]
    R16G16B16A16Unorm,
    #[serde(rename = "DXGI_FORMAT_R16G16B16A16_FLOAT")]
    R16G16B16A16Float,
}

impl TargetTextureFormat {
    pub fn dxgi_name(self) -> &'static str {
        match self {
            TargetTextureFormat::R8Unorm => "DXGI_FORMAT_R8_UNORM",
            TargetTextureFormat::B8G8R8A8Unorm => "DXGI_FORMAT_B8G8R8A8_UNORM",
            TargetTextureFormat::R16G16B16A16Unorm => "DXGI_FORMAT_R16G16B16A16_UNORM",
            TargetTextureFormat::R16G16B16A16Float => "DXGI_FORMAT_R16G16B16A16_FLOAT",
        }
    }
}

/// Map an editor source format to the format the renderer uploads.
pub fn convert_source_format(
    texture: &TextureAsset,
) -> Result<TargetTextureFormat, MaterialCompileError> {
    match texture.format.to_ascii_uppercase().as_str() {
        "G8" => Ok(TargetTextureFormat::R8Unorm),
        "BGRA8" => Ok(TargetTextureFormat::B8G8R8A8Unorm),
        "RGBA16" => Ok(TargetTextureFormat::R16G16B16A16Unorm),
        "RGBA16F" => Ok(TargetTextureFormat::R16G16B16A16Float),
        _ => Err(MaterialCompileError::UnsupportedResourceFormat {
            texture: texture.name.clone(),
            format: texture.format.clone(),
        }),
    }
}
