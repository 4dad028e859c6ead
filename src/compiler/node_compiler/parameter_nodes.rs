//! Compilers for parameter and constant nodes (ScalarParameter, VectorParameter, Constant*).

use anyhow::Result;

use super::super::error::MaterialCompileError;
use super::super::registry::ExpressionKind;
use super::super::types::{ComponentSelector, MaterialCompileContext};
use super::super::utils::{fmt_f32, vector_literal};
use super::super::walker::{ExpressionRequest, GraphWalker};
use crate::dsl::{parse_f32, parse_str, parse_vec4};

/// Name a parameter node is overridden by; falls back to the node id.
fn parameter_name<'a>(req: &ExpressionRequest<'a>) -> &'a str {
    parse_str(req.params(), "parameterName").unwrap_or(req.node_id())
}

/// Write the literal for `values` as picked by `selector`.
fn write_components(values: &[f32], selector: ComponentSelector, out: &mut String) {
    match selector {
        ComponentSelector::Whole => out.push_str(&vector_literal(values)),
        ComponentSelector::Rgb => out.push_str(&vector_literal(&values[..values.len().min(3)])),
        single => {
            let idx = single.channel().unwrap_or(0);
            out.push_str(&fmt_f32(values.get(idx).copied().unwrap_or(0.0)));
        }
    }
}

/// Compile a ScalarParameter node.
///
/// Emits the instance override for `parameterName` if one exists, else `defaultValue`.
pub fn compile_scalar_parameter(
    _walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let name = parameter_name(req);
    let value = ctx
        .overrides
        .scalar(name)
        .or_else(|| parse_f32(req.params(), "defaultValue"))
        .unwrap_or(0.0);
    out.push_str(&fmt_f32(value));
    Ok(())
}

/// Compile a VectorParameter node.
///
/// # Output
/// - whole value: `half4(r, g, b, a)`
/// - `RGB` pin: `half3(r, g, b)`
/// - `R`/`G`/`B`/`A` pins: the component literal
pub fn compile_vector_parameter(
    _walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let name = parameter_name(req);
    let value = ctx
        .overrides
        .vector(name)
        .or_else(|| parse_vec4(req.params(), "defaultValue"))
        .unwrap_or([0.0, 0.0, 0.0, 1.0]);
    write_components(&value, req.selector(), out);
    Ok(())
}

/// Compile a Constant, Constant2Vector, Constant3Vector or Constant4Vector node.
pub fn compile_constant(
    _walker: &GraphWalker<'_>,
    _ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let width = match req.node.kind {
        ExpressionKind::Constant => 1,
        ExpressionKind::Constant2Vector => 2,
        ExpressionKind::Constant3Vector => 3,
        ExpressionKind::Constant4Vector => 4,
        ref other => {
            return Err(MaterialCompileError::InvalidExpression {
                kind: other.to_string(),
                node: req.node_id().to_string(),
                reason: "not a constant kind".to_string(),
            }
            .into());
        }
    };

    let values: Vec<f32> = match req.params().get("value") {
        Some(serde_json::Value::Array(items)) => (0..width)
            .map(|i| items.get(i).and_then(|v| v.as_f64()).unwrap_or(0.0) as f32)
            .collect(),
        _ => {
            let v = parse_f32(req.params(), "value").unwrap_or(0.0);
            let mut values = vec![0.0; width];
            values[0] = v;
            values
        }
    };

    write_components(&values, req.selector(), out);
    Ok(())
}
