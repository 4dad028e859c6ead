//! Per-instance parameter overrides.

use std::collections::HashMap;

use log::debug;

use crate::dsl::MaterialInterface;

/// Instance-level constant values keyed by parameter name.
#[derive(Debug, Default, Clone)]
pub struct OverrideTable {
    vectors: HashMap<String, [f32; 4]>,
    scalars: HashMap<String, f32>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vectors.clear();
        self.scalars.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty() && self.scalars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vectors.len() + self.scalars.len()
    }

    /// Insert a vector override, returning the value it replaced.
    pub fn insert_vector(&mut self, name: impl Into<String>, value: [f32; 4]) -> Option<[f32; 4]> {
        self.vectors.insert(name.into(), value)
    }

    /// Insert a scalar override, returning the value it replaced.
    pub fn insert_scalar(&mut self, name: impl Into<String>, value: f32) -> Option<f32> {
        self.scalars.insert(name.into(), value)
    }

    pub fn vector(&self, name: &str) -> Option<[f32; 4]> {
        self.vectors.get(name).copied()
    }

    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.scalars.get(name).copied()
    }
}

/// Collect the override table for `material`.
///
/// A base material yields an empty table. For instances, the chain is applied from the
/// instance closest to the base material down to `material` itself, so the most derived
/// value wins; duplicate names within one list are last-write-wins as well.
pub fn resolve_overrides(material: &MaterialInterface) -> OverrideTable {
    let mut table = OverrideTable::new();
    for instance in material.instance_chain() {
        for v in &instance.vector_parameter_values {
            if let Some(prev) = table.insert_vector(&v.parameter_name, v.value) {
                debug!(
                    "{}: vector parameter {} overrides {:?} with {:?}",
                    instance.metadata.name, v.parameter_name, prev, v.value
                );
            }
        }
        for s in &instance.scalar_parameter_values {
            if let Some(prev) = table.insert_scalar(&s.parameter_name, s.value) {
                debug!(
                    "{}: scalar parameter {} overrides {} with {}",
                    instance.metadata.name, s.parameter_name, prev, s.value
                );
            }
        }
    }
    table
}
