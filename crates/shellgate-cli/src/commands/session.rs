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

//! Session command - verify access and run or forward a git command

use anyhow::{Context, Result};
use clap::Parser;
use shellgate_api::CommandType;
use shellgate_command::{CommandArgs, ReadWriter, SessionCommand, SessionOutcome};
use shellgate_config::Config;

use crate::output;

/// Run a git command on behalf of a remote shell session
///
/// The session's identity is checked against the internal API first.
/// Console messages and custom action results are written to standard
/// output; when the session may go ahead, where it would be forwarded is
/// reported on standard error.
///
/// # Examples
///
/// ```bash
/// shellgate --key-id 1 upload-pack group/project.git
/// shellgate --username jane receive-pack group/project.git < session-input
/// ```
#[derive(Parser, Debug)]
pub struct SessionCmd {
    /// Repository path, e.g. group/project.git
    #[arg(value_name = "REPO")]
    pub repo: String,
}

impl SessionCmd {
    pub async fn execute(
        &self,
        action: CommandType,
        config: &Config,
        args: &CommandArgs,
    ) -> Result<()> {
        let identity = args.identity()?;
        let command = SessionCommand::from_config(config, identity)
            .context("Failed to set up the internal API client")?;

        let mut rw = ReadWriter::new(tokio::io::stdin(), tokio::io::stdout());
        match command.execute(action, &self.repo, &mut rw).await? {
            SessionOutcome::Forward(transfer) => {
                output::info(&format!("Forwarding {} for {}", action, self.repo));
                output::detail("Address", &transfer.address);
                output::detail("Repository", &transfer.gl_repository);
                output::detail(
                    "Storage",
                    &format!(
                        "{}:{}",
                        transfer.repository.storage_name, transfer.repository.relative_path
                    ),
                );
                if !transfer.git_protocol.is_empty() {
                    output::detail("Protocol", &transfer.git_protocol);
                }
            }
            SessionOutcome::Completed => {
                tracing::debug!("Custom action completed the session");
            }
        }

        Ok(())
    }
}
