use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::cmd::RegisterArgs;
use crate::exit::{io_error, CliError, CliResult, INTERNAL, SUCCESS};

/// Host name browsers look the manifest up by. Must match the `name`
/// field inside the manifest file.
pub const HOST_NAME: &str = "natmsg.relayed_echo";

#[derive(Serialize)]
struct HostManifest {
    name: &'static str,
    description: &'static str,
    path: String,
    #[serde(rename = "type")]
    transport: &'static str,
    allowed_origins: Vec<String>,
}

pub fn run(args: RegisterArgs) -> CliResult<i32> {
    let path = std::env::current_exe()
        .map_err(|err| io_error("cannot resolve own executable path", err))?;

    let manifest = HostManifest {
        name: HOST_NAME,
        description: "natmsg relayed echo host",
        path: path.display().to_string(),
        transport: "stdio",
        allowed_origins: vec![format!("chrome-extension://{}/", args.extension_id)],
    };

    let target = match args.manifest {
        Some(path) => path,
        None => default_manifest_dir()?.join(format!("{HOST_NAME}.json")),
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| io_error("cannot create manifest directory", err))?;
    }

    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|err| CliError::new(INTERNAL, format!("manifest serialization failed: {err}")))?;
    std::fs::write(&target, json).map_err(|err| io_error("cannot write manifest", err))?;

    info!(path = ?target, "host manifest written");
    println!("{}", target.display());
    Ok(SUCCESS)
}

/// The browser's user-level native messaging host directory.
fn default_manifest_dir() -> CliResult<PathBuf> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| CliError::new(INTERNAL, "HOME is not set"))?;

    #[cfg(target_os = "macos")]
    let dir = home.join("Library/Application Support/Google/Chrome/NativeMessagingHosts");
    #[cfg(not(target_os = "macos"))]
    let dir = home.join(".config/google-chrome/NativeMessagingHosts");

    Ok(dir)
}
