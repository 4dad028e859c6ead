//! Compilers for texture nodes (TextureSample).

use anyhow::Result;
use log::debug;

use super::super::bindings::convert_source_format;
use super::super::error::MaterialCompileError;
use super::super::hlsl::{BASE_UV, SAMPLER_NAME};
use super::super::types::MaterialCompileContext;
use super::super::walker::{ExpressionRequest, GraphWalker};
use crate::dsl::parse_str;

/// Compile a TextureSample node.
///
/// The first request for a node binds its texture (once per texture) and defines a local
/// holding the sample; every request then references that local, swizzled by the output pin.
///
/// # Example
/// ```hlsl
/// Texture2D T_Brick;                                           // bound resource
/// half4 _s_sample0 = T_Brick.Sample(linearSampler, input.uv);  // definition
/// _s_sample0.r                                                 // expression
/// ```
pub fn compile_texture_sample(
    walker: &GraphWalker<'_>,
    ctx: &mut MaterialCompileContext,
    req: &ExpressionRequest<'_>,
    out: &mut String,
) -> Result<()> {
    let texture_name = parse_str(req.params(), "texture");
    let Some(texture) = texture_name.and_then(|name| walker.graph().texture(name)) else {
        return Err(MaterialCompileError::MissingTexture {
            node: req.node_id().to_string(),
            texture: texture_name.map(str::to_string),
        }
        .into());
    };

    // Fails before anything is bound, so a bad texture leaves no declarations behind.
    let format = convert_source_format(texture)?;

    let tex_var = ctx.bindings.texture_var(&texture.name);
    if ctx
        .bindings
        .bind_resource(&texture.name, format!("Texture2D {tex_var}"))
    {
        debug!(
            "bound texture {} ({}) for node {}",
            texture.name,
            format.dxgi_name(),
            req.node_id()
        );
    }

    let sample_var = ctx.bindings.local_var("s", req.node_id());
    if !ctx.bindings.has_definition(&sample_var) {
        let uv = walker.input_or_const(ctx, req, "UVs", BASE_UV.to_string())?;
        ctx.bindings.define(
            &sample_var,
            format!("half4 {sample_var} = {tex_var}.Sample({SAMPLER_NAME}, {uv})"),
        );
    }

    out.push_str(&sample_var);
    out.push_str(req.selector().swizzle());
    Ok(())
}
