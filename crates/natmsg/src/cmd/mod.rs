use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::exit::{CliError, CliResult, USAGE};

pub mod process;
pub mod register;
pub mod relay;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Relay messages between the browser's stdio and a spawned processor.
    Relay(RelayArgs),
    /// Run as the message processor (started by the relay).
    Process(ProcessArgs),
    /// Write and install the native messaging host manifest.
    Register(RegisterArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub async fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Relay(args) => relay::run(args).await,
        Command::Process(args) => process::run(args).await,
        Command::Register(args) => register::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RelayArgs {
    /// Extension origin, as passed by the browser at launch.
    #[arg(long)]
    pub origin: Option<String>,
    /// Startup handshake timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "10s")]
    pub sync_timeout: String,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Channel token issued by the relay at spawn time.
    #[arg(long)]
    pub pipe: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Extension id allowed to start this host.
    #[arg(long)]
    pub extension_id: String,
    /// Write the manifest to this file instead of the browser's manifest
    /// directory.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}
