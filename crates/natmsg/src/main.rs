mod cmd;
mod exit;
mod logging;

use std::ffi::OsString;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "natmsg", version, about = "Native messaging relay host")]
struct Cli {
    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        env = "NATMSG_LOG_FORMAT",
        default_value = "text",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "NATMSG_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse_from(rewrite_browser_args(std::env::args_os()));
    init_logging(cli.log_format, cli.log_level);

    match cmd::run(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

/// Browsers start a native messaging host with the extension origin as
/// the first argument (`chrome-extension://<id>/ [--parent-window=N]`)
/// rather than a subcommand; rewrite that launch convention into the
/// `relay` subcommand.
fn rewrite_browser_args(args: impl Iterator<Item = OsString>) -> Vec<OsString> {
    let args: Vec<OsString> = args.collect();
    let browser_launch = args
        .iter()
        .skip(1)
        .any(|arg| arg.to_string_lossy().starts_with("chrome-extension://"));
    if !browser_launch {
        return args;
    }

    let mut rewritten = vec![
        args.first().cloned().unwrap_or_else(|| OsString::from("natmsg")),
        OsString::from("relay"),
    ];
    for arg in &args[1..] {
        if arg.to_string_lossy().starts_with("chrome-extension://") {
            rewritten.push(OsString::from("--origin"));
            rewritten.push(arg.clone());
        }
        // Other browser-supplied options (e.g. --parent-window=N) carry
        // no meaning for this host and are dropped.
    }
    rewritten
}
