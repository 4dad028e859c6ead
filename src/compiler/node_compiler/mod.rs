//! Builtin codegen rules, one module per node family.

pub mod coordinate_nodes;
pub mod math_nodes;
pub mod parameter_nodes;
pub mod texture_nodes;
pub mod utility_nodes;
pub mod vector_nodes;

use super::registry::{ExpressionKind, ExpressionRegistry};

/// Install the rules for every builtin expression kind.
pub fn register_builtin_rules(registry: &mut ExpressionRegistry) {
    // Parameters and constants
    registry.register(
        ExpressionKind::ScalarParameter,
        parameter_nodes::compile_scalar_parameter,
    );
    registry.register(
        ExpressionKind::VectorParameter,
        parameter_nodes::compile_vector_parameter,
    );
    registry.register(ExpressionKind::Constant, parameter_nodes::compile_constant);
    registry.register(ExpressionKind::Constant2Vector, parameter_nodes::compile_constant);
    registry.register(ExpressionKind::Constant3Vector, parameter_nodes::compile_constant);
    registry.register(ExpressionKind::Constant4Vector, parameter_nodes::compile_constant);

    // Math
    registry.register(ExpressionKind::Add, math_nodes::compile_add);
    registry.register(ExpressionKind::Subtract, math_nodes::compile_subtract);
    registry.register(ExpressionKind::Multiply, math_nodes::compile_multiply);
    registry.register(ExpressionKind::Divide, math_nodes::compile_divide);
    registry.register(ExpressionKind::LinearInterpolate, math_nodes::compile_lerp);
    registry.register(ExpressionKind::Clamp, math_nodes::compile_clamp);
    registry.register(ExpressionKind::Power, math_nodes::compile_power);
    registry.register(ExpressionKind::OneMinus, math_nodes::compile_one_minus);

    // Coordinates
    registry.register(
        ExpressionKind::TextureCoordinate,
        coordinate_nodes::compile_texture_coordinate,
    );
    registry.register(ExpressionKind::Panner, coordinate_nodes::compile_panner);

    // Textures
    registry.register(
        ExpressionKind::TextureSample,
        texture_nodes::compile_texture_sample,
    );

    // Vectors
    registry.register(ExpressionKind::Normalize, vector_nodes::compile_normalize);
    registry.register(ExpressionKind::DotProduct, vector_nodes::compile_dot_product);
    registry.register(ExpressionKind::CrossProduct, vector_nodes::compile_cross_product);
    registry.register(ExpressionKind::ComponentMask, vector_nodes::compile_component_mask);

    // Utility
    registry.register(ExpressionKind::VertexColor, utility_nodes::compile_vertex_color);
    registry.register(ExpressionKind::Time, utility_nodes::compile_time);
    registry.register(ExpressionKind::SphereMask, utility_nodes::compile_sphere_mask);
    registry.register(ExpressionKind::Fresnel, utility_nodes::compile_fresnel);
}
