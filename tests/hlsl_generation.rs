use std::path::PathBuf;

use node_forge_material_compiler::{compiler::MaterialCompiler, dsl};

fn case_dir(case_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("cases")
        .join(case_name)
}

fn list_json_cases(dir: &std::path::Path) -> Vec<PathBuf> {
    let mut cases = Vec::new();
    let Ok(rd) = std::fs::read_dir(dir) else {
        return cases;
    };
    for entry in rd.flatten() {
        let path = entry.path();
        if path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            && std::fs::metadata(&path).is_ok_and(|m| m.is_file())
        {
            cases.push(path);
        }
    }
    cases.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    cases
}

fn case_stem(path: &std::path::Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("case")
        .to_string()
}

#[test]
fn material_json_compiles_to_golden_hlsl() {
    let dir = case_dir("hlsl_generation");
    let update_goldens = std::env::var("UPDATE_GOLDENS").is_ok_and(|v| v != "0");

    let json_cases = list_json_cases(&dir);
    assert!(
        !json_cases.is_empty(),
        "expected at least one *.json case in {}",
        dir.display()
    );

    let mut compiler = MaterialCompiler::new();
    for input_path in json_cases {
        let case_name = case_stem(&input_path);
        let material = dsl::load_material_from_path(&input_path)
            .unwrap_or_else(|e| panic!("case {case_name}: load material json failed: {e:#}"));

        let shader = compiler
            .compile(&material)
            .unwrap_or_else(|e| panic!("case {case_name}: compile failed: {e:#}"));

        let expected_path = dir.join(format!("{case_name}.ps.hlsl"));
        if update_goldens {
            std::fs::write(&expected_path, &shader)
                .unwrap_or_else(|e| panic!("write {:?}: {e}", expected_path));
        } else {
            let expected = std::fs::read_to_string(&expected_path)
                .unwrap_or_else(|e| panic!("read {:?}: {e}", expected_path));
            assert_eq!(
                shader, expected,
                "case {case_name}: HLSL differs from golden (rerun with UPDATE_GOLDENS=1 to accept)"
            );
        }
    }
}
