//! Compilers for math operation nodes (Add, Subtract, Multiply, Divide, LinearInterpolate,
//! Clamp, Power, OneMinus).

use anyhow::Result;

use super::super::types::MaterialCompileContext;
use super::super::utils::{fmt_f32, fmt_float_literal};
use super::super::walker::{ExpressionRequest, GraphWalker};
use crate::dsl::parse_f32;

/// Literal for an unlinked operand, read from the node's `key` param.
fn const_operand(req: &ExpressionRequest<'_>, key: &str, default: f32) -> String {
    fmt_f32(parse_f32(req.params(), key).unwrap_or(default))
}

/// Shared body of the two-operand arithmetic nodes: `A <op> B`, where each unlinked operand
/// falls back to `constA`/`constB`.
fn compile_binary(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    op: &str,
    format_const: fn(f32) -> String,
    out: &mut String,
) -> Result<()> {
    let a_const = format_const(parse_f32(req.params(), "constA").unwrap_or(0.0));
    let b_const = format_const(parse_f32(req.params(), "constB").unwrap_or(1.0));
    let a = walker.input_or_const(ctx, req, "A", a_const)?;
    let b = walker.input_or_const(ctx, req, "B", b_const)?;
    out.push_str(&format!("{a} {op} {b}"));
    Ok(())
}

/// Compile an Add node.
///
/// # Example
/// ```hlsl
/// (A) + (B)
/// ```
pub fn compile_add(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    compile_binary(walker, ctx, req, "+", fmt_f32, out)
}

pub fn compile_subtract(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    compile_binary(walker, ctx, req, "-", fmt_f32, out)
}

pub fn compile_multiply(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    compile_binary(walker, ctx, req, "*", fmt_f32, out)
}

/// Compile a Divide node.
///
/// Constant operands are written as float literals so `1 / 2` never becomes an integer
/// division in HLSL.
pub fn compile_divide(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    compile_binary(walker, ctx, req, "/", fmt_float_literal, out)
}

/// Compile a LinearInterpolate node.
///
/// # Inputs
/// - `A`, `B`: endpoints, `constA`/`constB` when unlinked
/// - `Alpha`: blend factor, `constAlpha` when unlinked
///
/// # Example
/// ```hlsl
/// lerp(A, B, Alpha)
/// ```
pub fn compile_lerp(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let a = walker.input_or_const(ctx, req, "A", const_operand(req, "constA", 0.0))?;
    let b = walker.input_or_const(ctx, req, "B", const_operand(req, "constB", 1.0))?;
    let t = walker.input_or_const(ctx, req, "Alpha", const_operand(req, "constAlpha", 0.5))?;
    out.push_str(&format!("lerp({a}, {b}, {t})"));
    Ok(())
}

/// Compile a Clamp node. `Input` must be linked; bounds fall back to
/// `minDefault`/`maxDefault`.
pub fn compile_clamp(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let v = walker.required_input(ctx, req, "Input")?;
    let lo = walker.input_or_const(ctx, req, "Min", const_operand(req, "minDefault", 0.0))?;
    let hi = walker.input_or_const(ctx, req, "Max", const_operand(req, "maxDefault", 1.0))?;
    out.push_str(&format!("clamp({v}, {lo}, {hi})"));
    Ok(())
}

/// Compile a Power node. `Base` must be linked; the exponent falls back to `constExponent`.
pub fn compile_power(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let base = walker.required_input(ctx, req, "Base")?;
    let exp = walker.input_or_const(
        ctx,
        req,
        "Exponent",
        const_operand(req, "constExponent", 2.0),
    )?;
    out.push_str(&format!("pow({base}, {exp})"));
    Ok(())
}

pub fn compile_one_minus(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let x = walker.required_input(ctx, req, "Input")?;
    out.push_str(&format!("1 - {x}"));
    Ok(())
}
