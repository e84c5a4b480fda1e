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

//! Access verification from the session's point of view.

use shellgate_api::{AccessClient, AccessOutcome, AccessResponse, CommandType, Identity};
use tokio::io::AsyncWrite;
use tracing::{info, warn};

use crate::console::display_console_messages;
use crate::error::{CommandError, CommandResult};

/// Checks a session's identity against the internal API
#[derive(Debug, Clone)]
pub struct AccessVerifier {
    client: AccessClient,
    identity: Identity,
}

impl AccessVerifier {
    pub fn new(client: AccessClient, identity: Identity) -> Self {
        Self { client, identity }
    }

    /// Identity this verifier asks about
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Verify that the session may run `action` on `repo`.
    ///
    /// Console messages from a parsed response are written to `out` before
    /// the decision is looked at, so they show up on denials too. A denial
    /// fails with the server's message verbatim.
    pub async fn verify<W>(
        &self,
        out: &mut W,
        action: CommandType,
        repo: &str,
    ) -> CommandResult<AccessResponse>
    where
        W: AsyncWrite + Unpin,
    {
        let response = self.client.verify(&self.identity, action, repo).await?;

        display_console_messages(out, &response.console_messages).await?;

        match response.outcome() {
            AccessOutcome::Denied => {
                warn!("{} denied {} on {}", self.identity, action, repo);
                Err(CommandError::Denied(response.message))
            }
            outcome => {
                info!("{} allowed {} on {} ({:?})", self.identity, action, repo, outcome);
                Ok(response)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use shellgate_api::mock::MockTransport;
    use shellgate_api::GitlabClient;
    use std::sync::Arc;

    const ALLOWED: &str = "/api/v4/internal/allowed";

    fn verifier(transport: &MockTransport, identity: Identity) -> AccessVerifier {
        let client = GitlabClient::new(Arc::new(transport.clone()));
        AccessVerifier::new(AccessClient::new(client), identity)
    }

    #[tokio::test]
    async fn test_console_messages_printed_in_order() {
        let transport = MockTransport::new();
        transport.respond_json(
            ALLOWED,
            200,
            &json!({"status": true, "gl_console_messages": ["console", "message"]}),
        );

        let mut out = Vec::new();
        let response = verifier(&transport, Identity::KeyId("1".into()))
            .verify(&mut out, CommandType::ReceivePack, "group/repo")
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(out, b"> GitLab: console\n> GitLab: message\n");
    }

    #[tokio::test]
    async fn test_denial_still_prints_messages() {
        let transport = MockTransport::new();
        transport.respond_json(
            ALLOWED,
            200,
            &json!({
                "status": false,
                "message": "Not allowed!",
                "gl_console_messages": ["one", "two"]
            }),
        );

        let mut out = Vec::new();
        let err = verifier(&transport, Identity::Username("first".into()))
            .verify(&mut out, CommandType::UploadPack, "group/repo")
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Denied(_)));
        assert_eq!(err.to_string(), "Not allowed!");
        assert_eq!(out, b"> GitLab: one\n> GitLab: two\n");
    }

    #[tokio::test]
    async fn test_api_errors_print_nothing() {
        let transport = MockTransport::new();
        transport.respond_raw(ALLOWED, 403, "");

        let mut out = Vec::new();
        let err = verifier(&transport, Identity::KeyId("4".into()))
            .verify(&mut out, CommandType::ReceivePack, "group/repo")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Internal API error (403)");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_redirect_is_returned_to_caller() {
        let transport = MockTransport::new();
        transport.respond_json(ALLOWED, 300, &json!({"status": true}));

        let mut out = Vec::new();
        let response = verifier(&transport, Identity::KeyId("1".into()))
            .verify(&mut out, CommandType::ReceivePack, "group/repo")
            .await
            .unwrap();

        assert!(response.is_custom_action());
        assert_eq!(response.outcome(), AccessOutcome::Redirected);
        assert!(out.is_empty());
    }
}
