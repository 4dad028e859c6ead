//! Graph walker: recursive expansion of output pins into HLSL expression text.

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use log::trace;

use super::error::MaterialCompileError;
use super::registry::ExpressionRegistry;
use super::types::{ComponentSelector, MaterialCompileContext};
use crate::graph::{GraphNode, MaterialGraph, OutputPin};

/// The output pin a rule is asked to expand, together with its node.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionRequest<'g> {
    pub node: &'g GraphNode,
    pub pin: &'g OutputPin,
}

impl<'g> ExpressionRequest<'g> {
    pub fn selector(&self) -> ComponentSelector {
        self.pin.selector
    }

    /// The output pin linked into `name`, if any.
    pub fn linked(&self, name: &str) -> Option<&'g OutputPin> {
        self.node.linked_input(name)
    }

    pub fn params(&self) -> &'g HashMap<String, serde_json::Value> {
        &self.node.params
    }

    pub fn node_id(&self) -> &'g str {
        &self.node.id
    }
}

pub struct GraphWalker<'a> {
    graph: &'a MaterialGraph,
    registry: &'a ExpressionRegistry,
}

impl<'a> GraphWalker<'a> {
    pub fn new(graph: &'a MaterialGraph, registry: &'a ExpressionRegistry) -> Self {
        Self { graph, registry }
    }

    pub fn graph(&self) -> &'a MaterialGraph {
        self.graph
    }

    /// Append the parenthesized expression for `pin` to `out`.
    pub fn parse(
        &self,
        ctx: &mut MaterialCompileContext,
        pin: &OutputPin,
        out: &mut String,
    ) -> Result<()> {
        let node = self
            .graph
            .node(pin.node)
            .ok_or_else(|| anyhow!("output pin references missing node index {}", pin.node))?;
        let pin = node.output(&pin.name).ok_or_else(|| {
            anyhow!("node {} ({}) has no output pin '{}'", node.id, node.kind, pin.name)
        })?;

        let Some(rule) = self.registry.lookup(&node.kind) else {
            return Err(MaterialCompileError::UnsupportedExpressionKind {
                kind: node.kind.to_string(),
                node: node.id.clone(),
            }
            .into());
        };

        let start = out.len();
        out.push('(');
        rule(self, ctx, &ExpressionRequest { node, pin }, out)?;
        out.push(')');
        trace!("{} [{}] -> {}", node.id, pin.name, &out[start..]);
        Ok(())
    }

    pub fn parse_to_string(&self, ctx: &mut MaterialCompileContext, pin: &OutputPin) -> Result<String> {
        let mut out = String::new();
        self.parse(ctx, pin, &mut out)?;
        Ok(out)
    }

    /// Expansion of the input `name`, or `fallback` when it is not linked.
    pub fn input_or_const(
        &self,
        ctx: &mut MaterialCompileContext,
        req: &ExpressionRequest<'_>,
        name: &str,
        fallback: String,
    ) -> Result<String> {
        match req.linked(name) {
            Some(link) => self.parse_to_string(ctx, link),
            None => Ok(fallback),
        }
    }

    /// Expansion of the input `name`, which must be linked.
    pub fn required_input(
        &self,
        ctx: &mut MaterialCompileContext,
        req: &ExpressionRequest<'_>,
        name: &str,
    ) -> Result<String> {
        let Some(link) = req.linked(name) else {
            return Err(MaterialCompileError::MissingRequiredLink {
                kind: req.node.kind.to_string(),
                node: req.node.id.clone(),
                input: name.to_string(),
            }
            .into());
        };
        self.parse_to_string(ctx, link)
    }
}
