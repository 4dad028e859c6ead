//! Embedded expression scheme: pin layouts and default params per node kind.

use std::{collections::HashMap, sync::OnceLock};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const DEFAULT_EXPRESSION_SCHEME_JSON: &str = include_str!("../assets/expression-scheme.json");

/// Prefix the editor puts on expression class names; the scheme is keyed without it.
pub const EDITOR_EXPRESSION_PREFIX: &str = "MaterialExpression";

static DEFAULT_SCHEME: OnceLock<ExpressionScheme> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionScheme {
    #[allow(dead_code)]
    pub version: String,
    pub expressions: HashMap<String, ExpressionTypeScheme>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionTypeScheme {
    #[serde(default)]
    pub category: Option<String>,
    /// Input pin names in declaration order.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Output pin names; the empty name is the whole-value output.
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(rename = "defaultParams", default)]
    pub default_params: HashMap<String, serde_json::Value>,
}

impl ExpressionScheme {
    /// Look up a node type, accepting both `Multiply` and `MaterialExpressionMultiply`.
    pub fn get(&self, node_type: &str) -> Option<&ExpressionTypeScheme> {
        self.expressions.get(node_type).or_else(|| {
            node_type
                .strip_prefix(EDITOR_EXPRESSION_PREFIX)
                .and_then(|t| self.expressions.get(t))
        })
    }
}

pub fn parse_scheme(text: &str) -> Result<ExpressionScheme> {
    let scheme: ExpressionScheme =
        serde_json::from_str(text).context("failed to parse expression scheme json")?;
    for (node_type, s) in &scheme.expressions {
        if s.outputs.is_empty() {
            bail!("expression scheme for {node_type} declares no outputs");
        }
    }
    Ok(scheme)
}

/// The scheme bundled with the crate, parsed once per process.
pub fn load_default_scheme() -> Result<&'static ExpressionScheme> {
    if let Some(scheme) = DEFAULT_SCHEME.get() {
        return Ok(scheme);
    }
    let parsed = parse_scheme(DEFAULT_EXPRESSION_SCHEME_JSON)?;
    Ok(DEFAULT_SCHEME.get_or_init(|| parsed))
}
