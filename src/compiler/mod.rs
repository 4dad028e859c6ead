//! Material graph → HLSL pixel shader compiler.
//!
//! - [`registry`]: expression kind → codegen rule table
//! - [`overrides`]: instance parameter override resolution
//! - [`bindings`]: bound textures and sampling definitions for one compile
//! - [`walker`]: recursive output pin expansion
//! - [`hlsl`]: fixed shader fragments and final assembly
//! - [`node_compiler`]: the builtin rules

pub mod bindings;
pub mod error;
pub mod hlsl;
pub mod node_compiler;
pub mod overrides;
pub mod registry;
pub mod types;
pub mod utils;
pub mod walker;

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::dsl::{MaterialDefaults, MaterialInterface};
use crate::graph::MaterialGraph;

pub use bindings::{ResourceBindingCache, TargetTextureFormat, convert_source_format};
pub use error::MaterialCompileError;
pub use overrides::{OverrideTable, resolve_overrides};
pub use registry::{CodegenRule, ExpressionKind, ExpressionRegistry};
pub use types::{ComponentSelector, MaterialCompileContext, MaterialProperty, ValueType};
pub use walker::{ExpressionRequest, GraphWalker};

/// Compiles materials to pixel shader source. One compile at a time per instance; create
/// one compiler per thread to compile concurrently.
#[derive(Debug)]
pub struct MaterialCompiler {
    registry: ExpressionRegistry,
    ctx: MaterialCompileContext,
}

impl Default for MaterialCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialCompiler {
    /// A compiler with every builtin rule registered.
    pub fn new() -> Self {
        Self::with_registry(ExpressionRegistry::with_builtin_rules())
    }

    pub fn with_registry(registry: ExpressionRegistry) -> Self {
        Self {
            registry,
            ctx: MaterialCompileContext::default(),
        }
    }

    pub fn registry(&self) -> &ExpressionRegistry {
        &self.registry
    }

    /// For registering custom expression kinds.
    pub fn registry_mut(&mut self) -> &mut ExpressionRegistry {
        &mut self.registry
    }

    /// State left behind by the last compile.
    pub fn context(&self) -> &MaterialCompileContext {
        &self.ctx
    }

    /// Compile `material` (a base material or an instance) to HLSL source text.
    ///
    /// Any error aborts the whole compile; no partial text is returned.
    pub fn compile(&mut self, material: &MaterialInterface) -> Result<String> {
        self.compile_inner(material)
            .with_context(|| format!("failed to compile material {}", material.name()))
    }

    fn compile_inner(&mut self, material: &MaterialInterface) -> Result<String> {
        self.ctx.reset();
        self.ctx.overrides = resolve_overrides(material);

        let graph = MaterialGraph::rebuild(material.base_material())?;
        let walker = GraphWalker::new(&graph, &self.registry);

        let mut body = String::new();
        let mut emitted: BTreeSet<MaterialProperty> = BTreeSet::new();
        for slot in graph.root_slots() {
            let Some(link) = slot.link.as_ref() else {
                continue;
            };
            if !slot.visible {
                debug!(
                    "{}: slot {} is linked but hidden, skipping",
                    material.name(),
                    slot.property.id()
                );
                continue;
            }
            if let Some(m) = slot.property.macro_name() {
                self.ctx.macros.insert(slot.property, m);
            }
            let expr = walker.parse_to_string(&mut self.ctx, link)?;
            body.push_str(&hlsl::slot_declaration(slot.property, &expr));
            emitted.insert(slot.property);
        }

        for property in MaterialProperty::REQUIRED {
            if emitted.contains(&property) {
                continue;
            }
            let value = required_default(property, graph.defaults());
            body.push_str(&hlsl::slot_declaration(property, &value));
        }

        let src = hlsl::assemble_pixel_shader(&self.ctx, &body);
        info!(
            "compiled material {}: {} slots, {} textures, {} samples",
            material.name(),
            emitted.len(),
            self.ctx.bindings.resource_count(),
            self.ctx.bindings.definition_count()
        );
        Ok(src)
    }
}

/// Fallback literal for a required slot nothing is linked to.
fn required_default(property: MaterialProperty, defaults: &MaterialDefaults) -> String {
    let v = match property {
        MaterialProperty::Metallic => defaults.metallic,
        MaterialProperty::Specular => defaults.specular,
        MaterialProperty::Roughness => defaults.roughness,
        _ => None,
    };
    utils::splat_literal(v.unwrap_or(0.0), property.value_type())
}

/// Compile `material` with a fresh compiler and the builtin rules.
pub fn compile_material(material: &MaterialInterface) -> Result<String> {
    MaterialCompiler::new().compile(material)
}
