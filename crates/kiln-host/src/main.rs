use anyhow::Context;
use kiln::config::{DEFAULT_CONFIG_PATH, load_config};
use kiln::host::Host;
use kiln::logging::init_logging;
use log::{error, info};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("kiln: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<ExitCode> {
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = load_config(&config_path)
        .with_context(|| format!("couldn't load config from {:?}", config_path))?;
    init_logging(&config.logging).context("couldn't set up logging")?;

    info!(
        "Starting Kiln v{} (module API {})...",
        env!("CARGO_PKG_VERSION"),
        kiln::API_VERSION
    );

    let mut host = Host::new(config.host);
    let exit = host.run();
    if exit != kiln::host::HostExit::Clean {
        error!("Kiln exited with {:?}.", exit);
    }

    Ok(exit.into())
}
