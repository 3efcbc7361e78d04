use clap::{Args, Subcommand};
use serde::Serialize;

use lutris_deploy::defaults::{self, DeployConfig};
use lutris_deploy::environment::EnvConfig;

use super::{CmdResult, GlobalArgs, Target};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display the resolved record for --host and the effective settings (default)
    Show,
    /// Show the path to config.json
    Path,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<EnvConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<DeployConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
}

pub fn run(args: ConfigArgs, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => path(global),
    }
}

fn show(global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let target = Target::load(global)?;

    Ok((
        ConfigOutput {
            command: "config.show".to_string(),
            host: Some(target.host.clone()),
            record: Some(target.record.clone()),
            local_root: Some(target.resolver.local_root().to_string()),
            config: Some(target.config),
            path: None,
            exists: None,
        },
        0,
    ))
}

fn path(global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let path = match &global.config {
        Some(path) => path.display().to_string(),
        None => defaults::config_path()?,
    };
    let exists = std::path::Path::new(&path).exists();

    Ok((
        ConfigOutput {
            command: "config.path".to_string(),
            host: None,
            record: None,
            local_root: None,
            config: None,
            path: Some(path),
            exists: Some(exists),
        },
        0,
    ))
}
