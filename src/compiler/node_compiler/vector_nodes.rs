//! Compilers for vector operation nodes (Normalize, DotProduct, CrossProduct, ComponentMask).

use anyhow::Result;

use super::super::error::MaterialCompileError;
use super::super::types::MaterialCompileContext;
use super::super::walker::{ExpressionRequest, GraphWalker};
use crate::dsl::parse_bool;

pub fn compile_normalize(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let v = walker.required_input(ctx, req, "VectorInput")?;
    out.push_str(&format!("normalize({v})"));
    Ok(())
}

/// Compile a DotProduct node. Both operands must be linked.
pub fn compile_dot_product(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let a = walker.required_input(ctx, req, "A")?;
    let b = walker.required_input(ctx, req, "B")?;
    out.push_str(&format!("dot({a}, {b})"));
    Ok(())
}

/// Compile a CrossProduct node. Both operands must be linked.
pub fn compile_cross_product(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let a = walker.required_input(ctx, req, "A")?;
    let b = walker.required_input(ctx, req, "B")?;
    out.push_str(&format!("cross({a}, {b})"));
    Ok(())
}

/// Compile a ComponentMask node: keeps the channels whose `r`/`g`/`b`/`a` flag is set.
///
/// # Example
/// ```hlsl
/// (Input).rb
/// ```
pub fn compile_component_mask(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let swizzle: String = ["r", "g", "b", "a"]
        .into_iter()
        .filter(|c| parse_bool(req.params(), c).unwrap_or(false))
        .collect();
    if swizzle.is_empty() {
        return Err(MaterialCompileError::InvalidExpression {
            kind: req.node.kind.to_string(),
            node: req.node_id().to_string(),
            reason: "component mask selects no channel".to_string(),
        }
        .into());
    }

    let v = walker.required_input(ctx, req, "Input")?;
    out.push_str(&format!("{v}.{swizzle}"));
    Ok(())
}
