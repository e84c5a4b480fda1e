// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! `shellgate` - access gateway for git over SSH.
//!
//! Asks the internal API whether a session may run a git command, shows the
//! server's console messages, and either runs the server-directed custom
//! action or reports where the transfer should be forwarded.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::SessionCmd;
use shellgate_api::CommandType;
use shellgate_command::CommandArgs;
use shellgate_config::{Config, ConfigLoader};
use shellgate_observability::{init_tracing_with_config, LogConfig, LogFormat, LogOutput};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shellgate")]
#[command(version, about = "Access gateway for git over SSH")]
#[command(
    long_about = "shellgate checks every git transfer started over a remote shell against the
internal authorization API before it is allowed to proceed."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (toml, yaml or json)
    #[arg(
        short,
        long,
        global = true,
        value_name = "PATH",
        env = "SHELLGATE_CONFIG",
        default_value = "config.yml"
    )]
    config: PathBuf,

    /// SSH key id of the session
    #[arg(long, global = true, value_name = "ID", conflicts_with = "username")]
    key_id: Option<String>,

    /// Username of the session
    #[arg(long, global = true, value_name = "NAME")]
    username: Option<String>,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Push to a repository
    #[command(name = "receive-pack", alias = "git-receive-pack")]
    ReceivePack(SessionCmd),

    /// Fetch from a repository
    #[command(name = "upload-pack", alias = "git-upload-pack")]
    UploadPack(SessionCmd),

    /// Download an archive of a repository
    #[command(name = "upload-archive", alias = "git-upload-archive")]
    UploadArchive(SessionCmd),
}

impl Commands {
    fn split(&self) -> (CommandType, &SessionCmd) {
        match self {
            Commands::ReceivePack(cmd) => (CommandType::ReceivePack, cmd),
            Commands::UploadPack(cmd) => (CommandType::UploadPack, cmd),
            Commands::UploadArchive(cmd) => (CommandType::UploadArchive, cmd),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle color output
    match cli.color.as_str() {
        "never" => console::set_colors_enabled_stderr(false),
        "always" => console::set_colors_enabled_stderr(true),
        "auto" => {}
        _ => {
            output::error(&format!("Invalid color option: {}", cli.color));
            std::process::exit(1);
        }
    }

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::new()
        .load_with_overrides(&cli.config)
        .await
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    init_logging(&config, cli.verbose)?;

    let args = CommandArgs {
        key_id: cli.key_id.clone(),
        username: cli.username.clone(),
    };

    let (action, cmd) = cli.command.split();
    cmd.execute(action, &config, &args).await
}

fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let format = LogFormat::parse(&config.log_format)?;
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    let output = match &config.log_file {
        Some(path) => LogOutput::File(path.clone()),
        None => LogOutput::Stderr,
    };

    init_tracing_with_config(
        LogConfig::new()
            .with_format(format)
            .with_level(level)
            .with_output(output),
    )
    .context("Failed to initialize logging")
}
