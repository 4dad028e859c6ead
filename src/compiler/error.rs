//! Error taxonomy for material compiles.

use thiserror::Error;

/// Fatal conditions that abort a material compile.
///
/// Compile entry points return `anyhow::Result`; callers that need to branch on the
/// failure kind can `downcast_ref::<MaterialCompileError>()` through any added context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterialCompileError {
    #[error("cannot parse expression: unsupported expression kind {kind} (node {node})")]
    UnsupportedExpressionKind { kind: String, node: String },
    #[error("{kind} node {node} requires input {input} to be linked")]
    MissingRequiredLink {
        kind: String,
        node: String,
        input: String,
    },
    #[error("texture {texture} uses unsupported source format {format}")]
    UnsupportedResourceFormat { texture: String, format: String },
    #[error("texture sample node {node} references unknown texture {texture:?}")]
    MissingTexture {
        node: String,
        texture: Option<String>,
    },
    #[error("cycle detected in material graph at node {node}")]
    CycleDetected { node: String },
    #[error("invalid {kind} node {node}: {reason}")]
    InvalidExpression {
        kind: String,
        node: String,
        reason: String,
    },
}
