//! Host entry point.
//!
//! # Responsibility
//! - Build the capability registry and run startup against a config directory.
//! - Open the configured database and install registered commands.
//! - Run the info command once so a local run shows the wiring works.

use log::{error, info};
use modhost_core::commands::info::INFO_COMMAND;
use modhost_core::{
    init_logging, CapabilityRegistry, CommandDispatcher, ExtensionKernel, HostConfig,
    PendingCommands,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_CONFIG_DIR: &str = "config";
const CONSOLE_SOURCE: &str = "console";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=host_run module=cli status=error error={}", err);
            eprintln!("modhost: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config_dir = resolve_config_dir(std::env::args().nth(1))?;

    let commands = Arc::new(PendingCommands::new());
    let registry = Arc::new(CapabilityRegistry::new(config_dir.clone(), commands.clone()));
    let kernel = ExtensionKernel::new();
    let extensions = modhost_core::start(&registry, &kernel)?;

    let host_config = registry.get_config::<HostConfig>()?;
    let host_config = host_config.read().clone();
    init_logging(&host_config.log_level, config_dir.join("logs"))?;
    info!(
        "event=host_config module=cli status=ok config_dir={} database_mode={:?} extensions={}",
        config_dir.display(),
        host_config.database.mode,
        extensions
    );

    let database = host_config.open_database(&config_dir)?;
    registry.attach_database(Arc::new(database))?;

    let mut dispatcher = CommandDispatcher::new();
    commands.install(&mut dispatcher, true)?;

    let outcome = dispatcher.execute(INFO_COMMAND, CONSOLE_SOURCE)?;
    for line in outcome.feedback {
        println!("{line}");
    }
    println!("config_dir={}", config_dir.display());
    println!("commands={}", dispatcher.names().join(","));
    Ok(())
}

fn resolve_config_dir(arg: Option<String>) -> Result<PathBuf, std::io::Error> {
    let path = PathBuf::from(arg.unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string()));
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()?.join(path))
}
