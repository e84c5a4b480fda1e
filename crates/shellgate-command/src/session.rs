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

//! Session command: verification, then custom action or forwarding.

use shellgate_api::{
    AccessClient, AccessOutcome, AccessResponse, CommandType, GitalyRepo, GitlabClient, Identity,
};
use shellgate_config::{Config, StdinCapture};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use crate::access::AccessVerifier;
use crate::custom_action::CustomActionDispatcher;
use crate::error::{CommandError, CommandResult};
use crate::readwriter::ReadWriter;

/// Everything the transfer backend needs to serve an authorized session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub action: CommandType,
    pub address: String,
    pub token: String,
    pub repository: GitalyRepo,
    pub gl_id: String,
    pub gl_username: String,
    pub gl_repository: String,
    pub git_config_options: Vec<String>,
    pub git_protocol: String,
}

impl TransferRequest {
    /// Take the routing metadata out of an authorized response
    pub fn from_response(action: CommandType, response: AccessResponse) -> CommandResult<Self> {
        if response.gitaly.address.is_empty() {
            return Err(CommandError::MissingTransferAddress);
        }

        Ok(Self {
            action,
            address: response.gitaly.address,
            token: response.gitaly.token,
            repository: response.gitaly.repo,
            gl_id: response.user_id,
            gl_username: response.username,
            gl_repository: response.repo,
            git_config_options: response.git_config_options,
            git_protocol: response.git_protocol,
        })
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Hand the session over to the transfer backend
    Forward(TransferRequest),
    /// A custom action served the session; nothing left to do
    Completed,
}

/// One git command run on behalf of a remote shell session
#[derive(Debug, Clone)]
pub struct SessionCommand {
    verifier: AccessVerifier,
    dispatcher: CustomActionDispatcher,
}

impl SessionCommand {
    pub fn new(client: GitlabClient, identity: Identity, capture: StdinCapture) -> Self {
        Self {
            verifier: AccessVerifier::new(AccessClient::new(client.clone()), identity),
            dispatcher: CustomActionDispatcher::new(client, capture),
        }
    }

    /// Build a session command talking HTTP to the configured API
    pub fn from_config(config: &Config, identity: Identity) -> CommandResult<Self> {
        let client = GitlabClient::from_config(config)?;
        Ok(Self::new(
            client,
            identity,
            config.custom_action.stdin_capture,
        ))
    }

    /// Verify access, then either run the custom action (pushes only) or
    /// describe where the transfer should go
    pub async fn execute<R, W>(
        &self,
        action: CommandType,
        repo: &str,
        rw: &mut ReadWriter<R, W>,
    ) -> CommandResult<SessionOutcome>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let response = self.verifier.verify(&mut rw.out, action, repo).await?;

        if action == CommandType::ReceivePack && response.outcome() == AccessOutcome::Redirected {
            info!("Running custom action for {} on {}", action, repo);
            self.dispatcher.run(&response, rw).await?;
            return Ok(SessionOutcome::Completed);
        }

        let transfer = TransferRequest::from_response(action, response)?;
        info!("Forwarding {} on {} to {}", action, repo, transfer.address);
        Ok(SessionOutcome::Forward(transfer))
    }
}
