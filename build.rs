use std::env;
use std::fs;
use std::path::Path;
use vergen::{BuildBuilder, CargoBuilder, Emitter, RustcBuilder};
use vergen_gitcl::{Emitter as GitEmitter, GitclBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;

    let cargo = CargoBuilder::default()
        .opt_level(true)
        .target_triple(true)
        .build()?;

    let rustc = RustcBuilder::default()
        .semver(true)
        .channel(true)
        .build()?;

    // Falls back to placeholder values outside a git checkout
    let gitcl = GitclBuilder::default().sha(true).build()?;

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&rustc)?
        .emit()?;

    GitEmitter::default().add_instructions(&gitcl)?.emit()?;

    copy_config()?;

    Ok(())
}

/// Copies `config/preflight.toml` next to the built binary so the tool finds
/// it when launched from `target/<profile>/`.
fn copy_config() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = env::var("OUT_DIR")?;

    // OUT_DIR is target/<profile>/build/lab-preflight-xxx/out
    let target_dir = Path::new(&out_dir)
        .parent()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .ok_or("Could not determine target directory")?;

    let source = Path::new("config/preflight.toml");
    println!("cargo:rerun-if-changed=config/preflight.toml");
    if source.exists() {
        let config_out_dir = target_dir.join("config");
        fs::create_dir_all(&config_out_dir)?;
        fs::copy(source, config_out_dir.join("preflight.toml"))?;
    }

    Ok(())
}
