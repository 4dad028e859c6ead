//! Compilers for utility nodes (VertexColor, Time, SphereMask, Fresnel).

use anyhow::Result;

use super::super::hlsl::{CAMERA_POSITION, TIME_REF, VERTEX_COLOR, VERTEX_NORMAL, WORLD_POSITION};
use super::super::types::MaterialCompileContext;
use super::super::utils::fmt_f32;
use super::super::walker::{ExpressionRequest, GraphWalker};
use crate::dsl::parse_f32;

pub fn compile_vertex_color(
    _walker: &GraphWalker<'_>,
    _ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    out.push_str(VERTEX_COLOR);
    out.push_str(req.selector().swizzle());
    Ok(())
}

pub fn compile_time(
    _walker: &GraphWalker<'_>,
    _ctx: &mut MaterialCompileContext,
    _req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    out.push_str(TIME_REF);
    Ok(())
}

/// Compile a SphereMask node.
///
/// # Inputs
/// - `A`, `B`: the two positions, both required
/// - `Radius`: `attenuationRadius` when unlinked
/// - `Hardness`: `hardness` when unlinked
///
/// # Example
/// ```hlsl
/// saturate(1 - pow(distance(A, B) / Radius, Hardness))
/// ```
pub fn compile_sphere_mask(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let a = walker.required_input(ctx, req, "A")?;
    let b = walker.required_input(ctx, req, "B")?;
    let radius = fmt_f32(parse_f32(req.params(), "attenuationRadius").unwrap_or(256.0));
    let hardness = fmt_f32(parse_f32(req.params(), "hardness").unwrap_or(1.0));
    let r = walker.input_or_const(ctx, req, "Radius", radius)?;
    let h = walker.input_or_const(ctx, req, "Hardness", hardness)?;
    out.push_str(&format!(
        "saturate(1 - pow(distance({a}, {b}) / {r}, {h}))"
    ));
    Ok(())
}

/// Compile a Fresnel node (Schlick approximation against the view direction).
///
/// # Example
/// ```hlsl
/// F0 + (1 - F0) * pow(1 - saturate(dot(normalize(N), normalize(campos - input.worldPos))), E)
/// ```
///
/// A linked `BaseReflectFractionIn` is read twice, so it is hoisted into a `half _f0_<node>`
/// local and expanded once.
pub fn compile_fresnel(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let exponent = fmt_f32(parse_f32(req.params(), "exponent").unwrap_or(5.0));
    let base = fmt_f32(parse_f32(req.params(), "baseReflectFraction").unwrap_or(0.04));
    let e = walker.input_or_const(ctx, req, "ExponentIn", exponent)?;
    let f0 = match req.linked("BaseReflectFractionIn") {
        Some(link) => {
            let var = ctx.bindings.local_var("f0", req.node_id());
            if !ctx.bindings.has_definition(&var) {
                let expr = walker.parse_to_string(ctx, link)?;
                ctx.bindings.define(&var, format!("half {var} = {expr}"));
            }
            var
        }
        None => base,
    };
    let n = walker.input_or_const(ctx, req, "Normal", VERTEX_NORMAL.to_string())?;
    out.push_str(&format!(
        "{f0} + (1 - {f0}) * pow(1 - saturate(dot(normalize({n}), normalize({CAMERA_POSITION} - {WORLD_POSITION}))), {e})"
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use crate::compiler::types::MaterialCompileContext;
    use serde_json::json;

    #[test]
    fn test_vertex_color_channels() {
        let material = test_material(vec![test_node("vc", "VertexColor", json!({}))], vec![]);
        assert_eq!(compile_node_output(&material, "vc", "").unwrap(), "(input.color)");
        assert_eq!(compile_node_output(&material, "vc", "A").unwrap(), "(input.color.a)");
    }

    #[test]
    fn test_time() {
        let material = test_material(vec![test_node("t", "Time", json!({}))], vec![]);
        assert_eq!(compile_node_output(&material, "t", "").unwrap(), "(time)");
    }

    #[test]
    fn test_sphere_mask_uses_param_fallbacks() {
        let material = test_material(
            vec![
                test_node("p", "VertexColor", json!({})),
                test_node("c", "Constant3Vector", json!({ "value": [0, 0, 0] })),
                test_node("mask", "SphereMask", json!({ "attenuationRadius": 64 })),
            ],
            vec![
                test_connection("p", "RGB", "mask", "A"),
                test_connection("c", "", "mask", "B"),
            ],
        );
        assert_eq!(
            compile_node_output(&material, "mask", "").unwrap(),
            "(saturate(1 - pow(distance((input.color.rgb), (half3(0, 0, 0))) / 64, 1)))"
        );
    }

    #[test]
    fn test_fresnel_defaults() {
        let material = test_material(vec![test_node("f", "Fresnel", json!({}))], vec![]);
        assert_eq!(
            compile_node_output(&material, "f", "").unwrap(),
            "(0.04 + (1 - 0.04) * pow(1 - saturate(dot(normalize(input.normal.xyz), \
             normalize(campos - input.worldPos))), 5))"
        );
    }

    #[test]
    fn test_fresnel_linked_base_reflect_expands_once() {
        let material = test_material(
            vec![
                test_node("k", "Multiply", json!({ "constA": 0.5, "constB": 0.1 })),
                test_node("f", "Fresnel", json!({})),
            ],
            vec![test_connection("k", "", "f", "BaseReflectFractionIn")],
        );
        let mut ctx = MaterialCompileContext::default();
        let s = compile_node_output_in(&mut ctx, &material, "f", "").unwrap();
        assert_eq!(
            s,
            "(_f0_f + (1 - _f0_f) * pow(1 - saturate(dot(normalize(input.normal.xyz), \
             normalize(campos - input.worldPos))), 5))"
        );
        assert_eq!(ctx.bindings.definition("_f0_f"), Some("half _f0_f = (0.5 * 0.1)"));
        assert!(!s.contains("0.5 * 0.1"));

        // A second request reuses the hoisted local.
        compile_node_output_in(&mut ctx, &material, "f", "").unwrap();
        assert_eq!(ctx.bindings.definition_count(), 1);
    }
}
