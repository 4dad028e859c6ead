//! HLSL text fragments shared by the codegen rules, and final pixel shader assembly.

use super::types::{MaterialCompileContext, MaterialProperty};

/// Token replaced by the downstream shader-content injector.
pub const SHADER_CONTENT_PLACEHOLDER: &str = "__SHADER_CONTENT__";

/// Shared shading headers every material includes, in include order.
pub const SHADER_HEADERS: [&str; 2] = ["common.hlsl", "pbr.hlsl"];

pub const SAMPLER_NAME: &str = "linearSampler";
pub const SAMPLER_DECLARATION: &str = "sampler linearSampler:register(s0);";
pub const ENTRY_SIGNATURE: &str = "half4 ps(PSInput input):SV_TARGET";

// Pixel shader inputs and globals provided by `common.hlsl`.
pub const BASE_UV: &str = "input.uv";
pub const VERTEX_COLOR: &str = "input.color";
pub const VERTEX_NORMAL: &str = "input.normal.xyz";
pub const WORLD_POSITION: &str = "input.worldPos";
pub const CAMERA_POSITION: &str = "campos";
pub const TIME_REF: &str = "time";

/// HLSL keywords and type names the generated shader may not use as identifiers.
const HLSL_KEYWORDS: &[&str] = &[
    "bool", "break", "const", "continue", "discard", "do", "else", "false", "float", "float2",
    "float3", "float4", "for", "half", "half2", "half3", "half4", "if", "in", "inout", "int",
    "out", "return", "sampler", "static", "struct", "Texture2D", "true", "uint", "void", "while",
];

const NORMAL_BLOCK: &str = "\
#ifdef HAS_NORMALMAP
\thalf3 _normal = calNormal(Normal.xyz, input.normal.xyz, input.tangent.xyz, input.binormal.xyz);
#else
\thalf3 _normal = input.normal.xyz;
#endif
";

/// Whether `name` is already spoken for inside the pixel shader: keywords, the frame's own
/// names and the slot locals.
pub fn is_reserved_identifier(name: &str) -> bool {
    HLSL_KEYWORDS.contains(&name)
        || matches!(name, "input" | "ps" | "PSInput" | "_normal" | "calNormal")
        || [SAMPLER_NAME, CAMERA_POSITION, TIME_REF].contains(&name)
        || MaterialProperty::ALL
            .iter()
            .any(|p| p.variable_name() == name)
}

/// Body statement assigning `expr` to the local for `property`.
pub fn slot_declaration(property: MaterialProperty, expr: &str) -> String {
    format!(
        "\t{} {} = {};\n",
        property.value_type().hlsl(),
        property.variable_name(),
        expr
    )
}

/// Concatenate the collected macros, resources and definitions with `body` into the final
/// pixel shader text.
pub fn assemble_pixel_shader(ctx: &MaterialCompileContext, body: &str) -> String {
    let mut src = String::new();

    src.push_str(&format!("#ifndef {SHADER_CONTENT_PLACEHOLDER}\n"));
    src.push_str("#error need shader content\n");
    src.push_str("#endif\n");
    for m in ctx.macros.values() {
        src.push_str(&format!("#define {m}\n"));
    }
    for h in SHADER_HEADERS {
        src.push_str(&format!("#include \"{h}\"\n"));
    }

    for decl in ctx.bindings.bound_resources() {
        src.push_str(decl);
        src.push_str(";\n");
    }
    src.push_str(SAMPLER_DECLARATION);
    src.push('\n');

    src.push_str(ENTRY_SIGNATURE);
    src.push_str("\n{\n");
    for def in ctx.bindings.definitions() {
        src.push('\t');
        src.push_str(def);
        src.push_str(";\n");
    }
    src.push_str(body);
    src.push_str(NORMAL_BLOCK);
    src.push('\t');
    src.push_str(SHADER_CONTENT_PLACEHOLDER);
    src.push_str("\n}");
    src
}
