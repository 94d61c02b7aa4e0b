//! ksplink bridge
//!
//! Host side of the cockpit link. Finds the panel among the serial ports,
//! confirms it with the handshake, then exchanges control and telemetry
//! packets until told to stop.
//!
//! Type `q` and Enter (or close stdin) to stop.

mod bench;
mod channels;
mod config;
mod error;
mod tasks;
mod transport;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use crate::channels::SHUTDOWN;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::tasks::{run_link, spawn_console_watcher};
use crate::transport::discover_ports;

#[derive(Parser)]
#[command(
    name = "ksplink-bridge",
    version,
    about = "Serial bridge between a flight simulator and a hardware cockpit panel"
)]
struct Cli {
    /// Configuration file [default: ./ksplink.toml when present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serial port to try before any other
    #[arg(short, long, value_name = "PORT")]
    port: Option<String>,

    /// Use the first port that opens without a handshake
    #[arg(long)]
    no_handshake: bool,

    /// Do not watch stdin for a quit command
    #[arg(long)]
    no_console: bool,

    /// Print the serial ports found and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), BridgeError> {
    if cli.list_ports {
        for name in discover_ports() {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut config = BridgeConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port.as_deref() {
        config.set_default_port(port)?;
    }
    if cli.no_handshake {
        config.link.handshake.enabled = false;
    }

    info!("ksplink bridge {}", env!("CARGO_PKG_VERSION"));
    if !cli.no_console {
        spawn_console_watcher(&SHUTDOWN)?;
        info!("Type q and Enter to stop");
    }

    run_link(&config, &SHUTDOWN)
}
