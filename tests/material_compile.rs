use node_forge_material_compiler::compiler::{
    ExpressionKind, ExpressionRequest, GraphWalker, MaterialCompileContext, MaterialCompileError,
    MaterialCompiler, compile_material,
};
use node_forge_material_compiler::dsl::{MaterialInterface, load_material_from_str};
use proptest::prelude::*;
use serde_json::{Value, json};

fn material_json(nodes: Value, connections: Value) -> Value {
    json!({
        "kind": "Material",
        "version": "1.0",
        "metadata": { "name": "M_Test", "created": null, "modified": null },
        "nodes": nodes,
        "connections": connections,
        "textures": [
            { "name": "T_Brick", "format": "BGRA8" },
            { "name": "T_Brick_N", "format": "RGBA16" },
            { "name": "T_Sky", "format": "RGBE8" }
        ]
    })
}

fn link(from: &str, from_port: &str, to: &str, to_port: &str) -> Value {
    json!({
        "id": format!("{from}_{to}_{to_port}"),
        "from": { "nodeId": from, "portId": from_port },
        "to": { "nodeId": to, "portId": to_port }
    })
}

fn load(value: Value) -> MaterialInterface {
    load_material_from_str(&value.to_string()).unwrap()
}

fn compile_err(value: Value) -> anyhow::Error {
    compile_material(&load(value)).unwrap_err()
}

#[test]
fn arithmetic_constants_are_joined_by_operator() {
    let material = load(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "mul", "type": "Multiply", "params": { "constA": 2, "constB": 3 } }
        ]),
        json!([link("mul", "", "root", "Metallic")]),
    ));
    let src = compile_material(&material).unwrap();
    assert!(src.contains("\thalf Metallic = (2 * 3);\n"), "{src}");
}

proptest! {
    #[test]
    fn arithmetic_literals_round_trip(a in -1000i32..1000, b in 1i32..1000, op in 0usize..3) {
        let (kind, sym) = [("Add", "+"), ("Subtract", "-"), ("Multiply", "*")][op];
        let material = load(material_json(
            json!([
                { "id": "root", "type": "MaterialRoot" },
                { "id": "n", "type": kind, "params": { "constA": a, "constB": b } }
            ]),
            json!([link("n", "", "root", "Roughness")]),
        ));
        let src = compile_material(&material).unwrap();
        let expected = format!("({a} {sym} {b})");
        prop_assert!(src.contains(&expected), "missing {} in {}", expected, src);
    }

    #[test]
    fn compile_is_idempotent(rough in 0.0f32..1.0, tiling in 1u32..8) {
        let material = load(material_json(
            json!([
                { "id": "root", "type": "MaterialRoot" },
                { "id": "uv", "type": "TextureCoordinate", "params": { "uTiling": tiling, "vTiling": tiling } },
                { "id": "s", "type": "TextureSample", "params": { "texture": "T_Brick" } },
                { "id": "r", "type": "ScalarParameter", "params": { "parameterName": "R", "defaultValue": rough } }
            ]),
            json!([
                link("uv", "", "s", "UVs"),
                link("s", "RGB", "root", "BaseColor"),
                link("r", "", "root", "Roughness")
            ]),
        ));
        let mut compiler = MaterialCompiler::new();
        let first = compiler.compile(&material).unwrap();
        let second = compiler.compile(&material).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn two_samplers_share_one_texture_declaration() {
    let material = load(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "s0", "type": "TextureSample", "params": { "texture": "T_Brick" } },
            { "id": "s1", "type": "TextureSample", "params": { "texture": "T_Brick" } },
            { "id": "add", "type": "Add" }
        ]),
        json!([
            link("s0", "RGB", "add", "A"),
            link("s1", "RGB", "add", "B"),
            link("add", "", "root", "BaseColor")
        ]),
    ));
    let mut compiler = MaterialCompiler::new();
    let src = compiler.compile(&material).unwrap();

    assert_eq!(src.matches("Texture2D T_Brick;").count(), 1, "{src}");
    assert_eq!(src.matches(".Sample(linearSampler").count(), 2, "{src}");
    assert_eq!(compiler.context().bindings.resource_count(), 1);
    assert_eq!(compiler.context().bindings.definition_count(), 2);
}

#[test]
fn sample_named_after_a_slot_keeps_its_own_local() {
    let material = load(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "Normal", "type": "TextureSample", "params": { "texture": "T_Brick_N" } }
        ]),
        json!([link("Normal", "RGB", "root", "Normal")]),
    ));
    let src = compile_material(&material).unwrap();
    assert_eq!(src.matches(" Normal =").count(), 1, "{src}");
    assert!(src.contains("\thalf4 _s_Normal = T_Brick_N.Sample(linearSampler, input.uv);\n"), "{src}");
    assert!(src.contains("\thalf3 Normal = (_s_Normal.rgb);\n"), "{src}");
}

#[test]
fn colliding_texture_names_bind_distinct_resources() {
    let mut doc = material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "a", "type": "TextureSample", "params": { "texture": "T-A" } },
            { "id": "b", "type": "TextureSample", "params": { "texture": "T_A" } },
            { "id": "add", "type": "Add" }
        ]),
        json!([
            link("a", "RGB", "add", "A"),
            link("b", "RGB", "add", "B"),
            link("add", "", "root", "BaseColor")
        ]),
    );
    doc["textures"] = json!([
        { "name": "T-A", "format": "BGRA8" },
        { "name": "T_A", "format": "BGRA8" }
    ]);
    let mut compiler = MaterialCompiler::new();
    let src = compiler.compile(&load(doc)).unwrap();
    assert_eq!(src.matches("Texture2D T_A;\n").count(), 1, "{src}");
    assert_eq!(src.matches("Texture2D T_A_1;\n").count(), 1, "{src}");
    assert_eq!(compiler.context().bindings.resource_count(), 2);
}

#[test]
fn vector_parameter_rgb_feeds_base_color() {
    let material = load(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "tint", "type": "VectorParameter",
              "params": { "parameterName": "Tint", "defaultValue": [1, 0.5, 0.25, 1] } }
        ]),
        json!([link("tint", "RGB", "root", "BaseColor")]),
    ));
    let src = compile_material(&material).unwrap();
    assert!(src.contains("\thalf3 Base_Color = (half3(1, 0.5, 0.25));\n"), "{src}");
}

fn override_material(instance: bool) -> MaterialInterface {
    let base = material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "rough", "type": "ScalarParameter",
              "params": { "parameterName": "Roughness", "defaultValue": 1.0 } }
        ]),
        json!([link("rough", "", "root", "Roughness")]),
    );
    if !instance {
        return load(base);
    }
    load(json!({
        "kind": "Instance",
        "metadata": { "name": "MI_Test", "created": null, "modified": null },
        "parent": base,
        "scalarParameterValues": [ { "parameterName": "Roughness", "value": 0.25 } ]
    }))
}

#[test]
fn instance_override_wins_over_default() {
    let src = compile_material(&override_material(true)).unwrap();
    assert!(src.contains("\thalf Roughness = (0.25);\n"), "{src}");

    let src = compile_material(&override_material(false)).unwrap();
    assert!(src.contains("\thalf Roughness = (1);\n"), "{src}");
}

#[test]
fn overrides_do_not_leak_between_compiles() {
    let mut compiler = MaterialCompiler::new();
    compiler.compile(&override_material(true)).unwrap();
    let src = compiler.compile(&override_material(false)).unwrap();
    assert!(src.contains("\thalf Roughness = (1);\n"), "{src}");
}

#[test]
fn unconnected_required_slots_get_defaults() {
    let mut doc = material_json(json!([{ "id": "root", "type": "MaterialRoot" }]), json!([]));
    let src = compile_material(&load(doc.clone())).unwrap();
    assert!(src.contains("\thalf Metallic = 0;\n"), "{src}");
    assert!(src.contains("\thalf3 Base_Color = half3(0, 0, 0);\n"), "{src}");
    assert!(src.contains("\thalf3 Emissive_Color = half3(0, 0, 0);\n"), "{src}");

    doc["defaults"] = json!({ "metallic": 0.8, "roughness": 0.4 });
    let src = compile_material(&load(doc)).unwrap();
    assert!(src.contains("\thalf Metallic = 0.8;\n"), "{src}");
    assert!(src.contains("\thalf Roughness = 0.4;\n"), "{src}");
    assert!(src.contains("\thalf Specular = 0;\n"), "{src}");
}

#[test]
fn normal_macro_requires_visible_normal_link() {
    let nodes = json!([
        { "id": "root", "type": "MaterialRoot" },
        { "id": "n", "type": "TextureSample", "params": { "texture": "T_Brick_N", "samplerType": "Normal" } }
    ]);
    let linked = material_json(nodes.clone(), json!([link("n", "RGB", "root", "Normal")]));

    let src = compile_material(&load(linked.clone())).unwrap();
    assert!(src.contains("#define HAS_NORMALMAP\n"), "{src}");
    assert!(src.contains("\thalf3 Normal = (_s_n.rgb);\n"), "{src}");

    let unlinked = material_json(nodes, json!([]));
    let src = compile_material(&load(unlinked)).unwrap();
    assert!(!src.contains("#define HAS_NORMALMAP"), "{src}");

    // Unlit hides the normal slot.
    let mut unlit = linked;
    unlit["settings"] = json!({ "shadingModel": "Unlit" });
    let src = compile_material(&load(unlit)).unwrap();
    assert!(!src.contains("#define HAS_NORMALMAP"), "{src}");
    assert!(!src.contains("Texture2D T_Brick_N"), "{src}");
}

#[test]
fn opacity_mask_only_compiles_for_masked_materials() {
    let mut doc = material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "c", "type": "Constant", "params": { "value": 0.5 } }
        ]),
        json!([link("c", "", "root", "OpacityMask")]),
    );
    let src = compile_material(&load(doc.clone())).unwrap();
    assert!(!src.contains("Opacity_Mask"), "{src}");

    doc["settings"] = json!({ "blendMode": "Masked" });
    let src = compile_material(&load(doc)).unwrap();
    assert!(src.contains("\thalf Opacity_Mask = (0.5);\n"), "{src}");
}

#[test]
fn unregistered_kind_fails_the_compile() {
    let err = compile_err(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "noise", "type": "MaterialExpressionNoise" }
        ]),
        json!([link("noise", "", "root", "BaseColor")]),
    ));
    assert!(format!("{err:#}").contains("MaterialExpressionNoise"), "{err:#}");
    assert!(format!("{err:#}").contains("failed to compile material M_Test"), "{err:#}");
    assert!(matches!(
        err.downcast_ref::<MaterialCompileError>(),
        Some(MaterialCompileError::UnsupportedExpressionKind { kind, .. }) if kind == "MaterialExpressionNoise"
    ));
}

#[test]
fn custom_rule_makes_unknown_kind_compile() {
    fn noise(
        _walker: &GraphWalker<'_>,
        _ctx: &mut MaterialCompileContext,
        _req: &ExpressionRequest<'_>,
        out: &mut String,
    ) -> anyhow::Result<()> {
        out.push_str("noise(input.uv)");
        Ok(())
    }

    let material = load(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "noise", "type": "Noise" }
        ]),
        json!([link("noise", "", "root", "Roughness")]),
    ));
    let mut compiler = MaterialCompiler::new();
    compiler
        .registry_mut()
        .register(ExpressionKind::Custom("Noise".to_string()), noise);
    let src = compiler.compile(&material).unwrap();
    assert!(src.contains("\thalf Roughness = (noise(input.uv));\n"), "{src}");
}

#[test]
fn unlinked_vector_op_inputs_are_fatal() {
    for (kind, input) in [
        ("Normalize", "VectorInput"),
        ("DotProduct", "A"),
        ("CrossProduct", "A"),
    ] {
        let err = compile_err(material_json(
            json!([
                { "id": "root", "type": "MaterialRoot" },
                { "id": "op", "type": kind }
            ]),
            json!([link("op", "", "root", "BaseColor")]),
        ));
        assert_eq!(
            err.downcast_ref::<MaterialCompileError>(),
            Some(&MaterialCompileError::MissingRequiredLink {
                kind: kind.to_string(),
                node: "op".to_string(),
                input: input.to_string(),
            }),
            "{kind}"
        );
    }
}

#[test]
fn unsupported_texture_format_is_fatal() {
    let err = compile_err(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "sky", "type": "TextureSample", "params": { "texture": "T_Sky" } }
        ]),
        json!([link("sky", "RGB", "root", "EmissiveColor")]),
    ));
    assert_eq!(
        err.downcast_ref::<MaterialCompileError>(),
        Some(&MaterialCompileError::UnsupportedResourceFormat {
            texture: "T_Sky".to_string(),
            format: "RGBE8".to_string(),
        })
    );
}

#[test]
fn cycles_are_rejected_before_walking() {
    let err = compile_err(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "a", "type": "Add" },
            { "id": "b", "type": "Multiply" }
        ]),
        json!([
            link("a", "", "b", "A"),
            link("b", "", "a", "A"),
            link("a", "", "root", "Metallic")
        ]),
    ));
    assert!(matches!(
        err.downcast_ref::<MaterialCompileError>(),
        Some(MaterialCompileError::CycleDetected { .. })
    ));
}

#[test]
fn fan_in_to_one_input_is_rejected() {
    let err = compile_err(material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "a", "type": "Constant" },
            { "id": "b", "type": "Constant" }
        ]),
        json!([
            link("a", "", "root", "Metallic"),
            link("b", "", "root", "Metallic")
        ]),
    ));
    assert!(format!("{err:#}").contains("more than one link"), "{err:#}");
}

#[test]
fn instance_chain_resolves_most_derived_value() {
    let base = material_json(
        json!([
            { "id": "root", "type": "MaterialRoot" },
            { "id": "tint", "type": "VectorParameter",
              "params": { "parameterName": "Tint", "defaultValue": [1, 1, 1, 1] } },
            { "id": "mask", "type": "ComponentMask", "params": { "r": true, "g": true, "b": true } }
        ]),
        json!([
            link("tint", "", "mask", "Input"),
            link("mask", "", "root", "BaseColor")
        ]),
    );
    let material = load(json!({
        "kind": "Instance",
        "metadata": { "name": "MI_Child", "created": null, "modified": null },
        "parent": {
            "kind": "Instance",
            "metadata": { "name": "MI_Parent", "created": null, "modified": null },
            "parent": base,
            "vectorParameterValues": [ { "parameterName": "Tint", "value": [0, 1, 0, 1] } ]
        },
        "vectorParameterValues": [ { "parameterName": "Tint", "value": [0, 0, 1, 1] } ]
    }));
    let src = compile_material(&material).unwrap();
    assert!(
        src.contains("\thalf3 Base_Color = ((half4(0, 0, 1, 1)).rgb);\n"),
        "{src}"
    );
}
