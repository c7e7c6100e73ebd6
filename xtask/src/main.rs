use kiln::config::{DEFAULT_CONFIG_PATH, HostConfig};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX, EXE_SUFFIX};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{}", e);
        std::process::exit(-1);
    }
}

type DynError = Box<dyn std::error::Error>;

fn try_main() -> Result<(), DynError> {
    let mut args = env::args().skip(1);
    let task = args.next();
    let release = args.any(|arg| arg == "--release");
    match task.as_deref() {
        Some("stage") => stage_task(release)?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!("
Tasks:
\tstage [--release] - build the host and the module libraries and copy them to target/stage along with a default config.
    ");
}

fn stage_task(release: bool) -> Result<(), DynError> {
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let mut build = Command::new(cargo);
    build
        .current_dir(project_root()?)
        .args(["build", "-p", "kiln-host", "-p", "kiln-graphics", "-p", "hello-module"]);
    if release {
        build.arg("--release");
    }
    if !build.status()?.success() {
        Err("cargo build failed")?;
    }

    let root = project_root()?;
    let out = root
        .join("target")
        .join(if release { "release" } else { "debug" });
    let stage = root.join("target").join("stage");
    fs::create_dir_all(&stage)?;

    let outputs = [
        format!("kiln-host{EXE_SUFFIX}"),
        format!("{DLL_PREFIX}kiln_graphics{DLL_SUFFIX}"),
        format!("{DLL_PREFIX}hello_module{DLL_SUFFIX}"),
    ];
    for output in &outputs {
        fs::copy(out.join(output), stage.join(output))?;
        println!("staged {}", output);
    }

    let config = stage.join(DEFAULT_CONFIG_PATH);
    if !config.exists() {
        if let Some(parent) = config.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config, HostConfig::default().to_toml()?)?;
        println!("wrote {}", config.display());
    }
    fs::create_dir_all(stage.join("data"))?;

    Ok(())
}

fn project_root() -> Result<PathBuf, DynError> {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .map(Path::to_path_buf)
        .ok_or_else(|| "xtask has no parent directory".into())
}
