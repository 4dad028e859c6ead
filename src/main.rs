use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use log::info;
use node_forge_material_compiler::{compiler::MaterialCompiler, dsl, manifest};

#[derive(Debug, Default, Clone)]
struct Cli {
    material_json: Option<PathBuf>,
    output: Option<PathBuf>,
    manifest: Option<PathBuf>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--material-json" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --material-json"));
                };
                cli.material_json = Some(PathBuf::from(v));
                i += 2;
            }
            "--output" | "-o" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --output"));
                };
                cli.output = Some(PathBuf::from(v));
                i += 2;
            }
            "--manifest" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --manifest"));
                };
                cli.manifest = Some(PathBuf::from(v));
                i += 2;
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: --material-json <material.json>, --output <shader.hlsl>, --manifest <manifest.json>)"
                ));
            }
        }
    }
    Ok(cli)
}

fn run(cli: Cli) -> Result<()> {
    let path = cli
        .material_json
        .ok_or_else(|| anyhow!("--material-json <material.json> is required"))?;
    let material = dsl::load_material_from_path(&path)?;

    let mut compiler = MaterialCompiler::new();
    let shader = compiler.compile(&material)?;

    match &cli.output {
        Some(out) => {
            std::fs::write(out, &shader)
                .with_context(|| format!("failed to write shader to {}", out.display()))?;
            info!("wrote {} ({} bytes)", out.display(), shader.len());
        }
        None => println!("{shader}"),
    }

    if let Some(out) = &cli.manifest {
        let text = manifest::build_material_manifest(&material)?.to_json_pretty()?;
        std::fs::write(out, text)
            .with_context(|| format!("failed to write manifest to {}", out.display()))?;
        info!("wrote manifest {}", out.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&args)?;
    run(cli)
}
