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

//! Custom action dispatch.
//!
//! A redirected push names an ordered list of endpoints. Each one is called
//! in turn with the payload data and the base64 of the local input captured
//! after the previous call; its decoded result is echoed to the session
//! before the next input is captured. Any failure ends the sequence; output
//! already written stays written.

use shellgate_api::custom_action::encode;
use shellgate_api::{
    AccessResponse, CustomActionRequest, CustomActionResponse, CustomPayloadData, GitlabClient,
    Method,
};
use shellgate_config::StdinCapture;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::console::display_info_message;
use crate::error::{CommandError, CommandResult};
use crate::readwriter::ReadWriter;

/// State handed from one endpoint call to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carry {
    /// Index of the endpoint to call next
    pub step: usize,
    /// Input captured after the previous call
    pub output: Vec<u8>,
}

impl Carry {
    fn request(&self, data: &CustomPayloadData) -> CustomActionRequest {
        CustomActionRequest {
            data: data.clone(),
            output: encode(&self.output),
        }
    }
}

/// Runs the custom action named by a redirect response
#[derive(Debug, Clone)]
pub struct CustomActionDispatcher {
    client: GitlabClient,
    capture: StdinCapture,
}

impl CustomActionDispatcher {
    pub fn new(client: GitlabClient, capture: StdinCapture) -> Self {
        Self { client, capture }
    }

    /// Run every endpoint of `response`'s payload in order
    pub async fn run<R, W>(
        &self,
        response: &AccessResponse,
        rw: &mut ReadWriter<R, W>,
    ) -> CommandResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let data = response
            .payload
            .as_ref()
            .map(|payload| payload.data.clone())
            .unwrap_or_default();

        if data.api_endpoints.is_empty() {
            warn!("Custom action without endpoints");
            return Err(CommandError::EmptyEndpoints);
        }

        display_info_message(&mut rw.out, &data.info_message).await?;

        let data = CustomPayloadData {
            user_id: response.user_id.clone(),
            ..data
        };

        let mut carry = Carry::default();
        while carry.step < data.api_endpoints.len() {
            carry = self.step(&data, carry, rw).await.inspect_err(|e| {
                warn!("Custom action aborted: {}", e);
            })?;
        }

        Ok(())
    }

    /// Call the endpoint at `carry.step`, echo its result and capture input
    async fn step<R, W>(
        &self,
        data: &CustomPayloadData,
        carry: Carry,
        rw: &mut ReadWriter<R, W>,
    ) -> CommandResult<Carry>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let endpoint = &data.api_endpoints[carry.step];
        debug!(
            "Custom action step {}/{}: {}",
            carry.step + 1,
            data.api_endpoints.len(),
            endpoint
        );

        let response = self
            .client
            .do_request(Method::POST, endpoint, &carry.request(data))
            .await?;
        let reply: CustomActionResponse = response.parse_json()?;

        let mut result = reply.decode_result()?;
        result.push(b'\n');
        rw.write_all(&result).await?;

        let output = rw.capture(self.capture).await?;

        Ok(Carry {
            step: carry.step + 1,
            output,
        })
    }
}
