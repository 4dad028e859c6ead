//! Expression registry: node kind -> codegen rule.

use std::{collections::HashMap, fmt};

use anyhow::Result;

use super::node_compiler;
use super::types::MaterialCompileContext;
use super::walker::{ExpressionRequest, GraphWalker};
use crate::schema::EDITOR_EXPRESSION_PREFIX;

/// Kind tag of a shading expression node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    ScalarParameter,
    VectorParameter,
    Constant,
    Constant2Vector,
    Constant3Vector,
    Constant4Vector,
    Add,
    Subtract,
    Multiply,
    Divide,
    LinearInterpolate,
    Clamp,
    Power,
    OneMinus,
    TextureCoordinate,
    Panner,
    TextureSample,
    VertexColor,
    Time,
    Normalize,
    DotProduct,
    CrossProduct,
    SphereMask,
    ComponentMask,
    Fresnel,
    /// A kind the crate has no builtin rule for; compiles only if a rule is registered.
    Custom(String),
}

impl ExpressionKind {
    pub const BUILTIN: [ExpressionKind; 25] = [
        ExpressionKind::ScalarParameter,
        ExpressionKind::VectorParameter,
        ExpressionKind::Constant,
        ExpressionKind::Constant2Vector,
        ExpressionKind::Constant3Vector,
        ExpressionKind::Constant4Vector,
        ExpressionKind::Add,
        ExpressionKind::Subtract,
        ExpressionKind::Multiply,
        ExpressionKind::Divide,
        ExpressionKind::LinearInterpolate,
        ExpressionKind::Clamp,
        ExpressionKind::Power,
        ExpressionKind::OneMinus,
        ExpressionKind::TextureCoordinate,
        ExpressionKind::Panner,
        ExpressionKind::TextureSample,
        ExpressionKind::VertexColor,
        ExpressionKind::Time,
        ExpressionKind::Normalize,
        ExpressionKind::DotProduct,
        ExpressionKind::CrossProduct,
        ExpressionKind::SphereMask,
        ExpressionKind::ComponentMask,
        ExpressionKind::Fresnel,
    ];

    /// Parse a node `type` string; the editor's `MaterialExpression` prefix is optional.
    pub fn from_node_type(node_type: &str) -> Self {
        let name = node_type
            .strip_prefix(EDITOR_EXPRESSION_PREFIX)
            .unwrap_or(node_type);
        Self::BUILTIN
            .into_iter()
            .find(|k| k.name() == name)
            .unwrap_or_else(|| ExpressionKind::Custom(node_type.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            ExpressionKind::ScalarParameter => "ScalarParameter",
            ExpressionKind::VectorParameter => "VectorParameter",
            ExpressionKind::Constant => "Constant",
            ExpressionKind::Constant2Vector => "Constant2Vector",
            ExpressionKind::Constant3Vector => "Constant3Vector",
            ExpressionKind::Constant4Vector => "Constant4Vector",
            ExpressionKind::Add => "Add",
            ExpressionKind::Subtract => "Subtract",
            ExpressionKind::Multiply => "Multiply",
            ExpressionKind::Divide => "Divide",
            ExpressionKind::LinearInterpolate => "LinearInterpolate",
            ExpressionKind::Clamp => "Clamp",
            ExpressionKind::Power => "Power",
            ExpressionKind::OneMinus => "OneMinus",
            ExpressionKind::TextureCoordinate => "TextureCoordinate",
            ExpressionKind::Panner => "Panner",
            ExpressionKind::TextureSample => "TextureSample",
            ExpressionKind::VertexColor => "VertexColor",
            ExpressionKind::Time => "Time",
            ExpressionKind::Normalize => "Normalize",
            ExpressionKind::DotProduct => "DotProduct",
            ExpressionKind::CrossProduct => "CrossProduct",
            ExpressionKind::SphereMask => "SphereMask",
            ExpressionKind::ComponentMask => "ComponentMask",
            ExpressionKind::Fresnel => "Fresnel",
            ExpressionKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Writes the expression text for one output pin request into `out`.
///
/// Rules must only recurse into other nodes through `GraphWalker::parse` (or its
/// helpers); declaration caching relies on walker-ordered traversal.
pub type CodegenRule = fn(
    &GraphWalker<'_>,
    &mut MaterialCompileContext,
    &ExpressionRequest<'_>,
    &mut String,
) -> Result<()>;

#[derive(Clone, Default)]
pub struct ExpressionRegistry {
    rules: HashMap<ExpressionKind, CodegenRule>,
}

impl ExpressionRegistry {
    /// An empty registry; every kind is unsupported until registered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        node_compiler::register_builtin_rules(&mut registry);
        registry
    }

    /// Install `rule` for `kind`, returning the rule it replaced.
    pub fn register(&mut self, kind: ExpressionKind, rule: CodegenRule) -> Option<CodegenRule> {
        self.rules.insert(kind, rule)
    }

    pub fn lookup(&self, kind: &ExpressionKind) -> Option<CodegenRule> {
        self.rules.get(kind).copied()
    }

    pub fn contains(&self, kind: &ExpressionKind) -> bool {
        self.rules.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for ExpressionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.rules.keys().map(|k| k.name()).collect();
        kinds.sort_unstable();
        f.debug_struct("ExpressionRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
