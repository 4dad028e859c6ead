//! Compilers for UV coordinate nodes (TextureCoordinate, Panner).

use anyhow::Result;

use super::super::hlsl::{BASE_UV, TIME_REF};
use super::super::types::MaterialCompileContext;
use super::super::utils::fmt_f32;
use super::super::walker::{ExpressionRequest, GraphWalker};
use crate::dsl::{parse_f32, parse_u32};

/// Vertex UV set `index`; set 0 is the base `input.uv`.
pub fn uv_channel(index: u32) -> String {
    if index == 0 {
        BASE_UV.to_string()
    } else {
        format!("{BASE_UV}{index}")
    }
}

/// Compile a TextureCoordinate node.
///
/// # Example
/// ```hlsl
/// input.uv * half2(uTiling, vTiling)
/// ```
pub fn compile_texture_coordinate(
    _walker: &GraphWalker<'_>,
    _ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let index = parse_u32(req.params(), "coordinateIndex").unwrap_or(0);
    let u = parse_f32(req.params(), "uTiling").unwrap_or(1.0);
    let v = parse_f32(req.params(), "vTiling").unwrap_or(1.0);
    out.push_str(&format!(
        "{} * half2({}, {})",
        uv_channel(index),
        fmt_f32(u),
        fmt_f32(v)
    ));
    Ok(())
}

/// Compile a Panner node: scrolls `Coordinate` by `(speedX, speedY)` per unit of `Time`.
pub fn compile_panner(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let coord = walker.input_or_const(ctx, req, "Coordinate", BASE_UV.to_string())?;
    let time = walker.input_or_const(ctx, req, "Time", TIME_REF.to_string())?;
    let sx = parse_f32(req.params(), "speedX").unwrap_or(0.0);
    let sy = parse_f32(req.params(), "speedY").unwrap_or(0.0);
    out.push_str(&format!(
        "{coord} + half2({}, {}) * {time}",
        fmt_f32(sx),
        fmt_f32(sy)
    ));
    Ok(())
}
