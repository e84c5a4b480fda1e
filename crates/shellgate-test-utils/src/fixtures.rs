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

//! JSON fixtures for the internal API exchanges.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

/// Route of the authorization check as seen by the server
pub const ALLOWED_ROUTE: &str = "/api/v4/internal/allowed";

/// Test fixture data.
pub struct TestFixtures;

impl TestFixtures {
    /// Repository path used across fixtures
    pub const REPO: &'static str = "group/repo";

    /// Successful authorization body carrying full routing metadata
    pub fn allowed_body() -> Value {
        json!({
            "status": true,
            "gl_id": "1",
            "gl_repository": Self::REPO,
            "gl_username": "someuser",
            "git_config_options": ["option"],
            "gitaly": {
                "repository": {
                    "storage_name": "storage_name",
                    "relative_path": "relative_path",
                    "git_object_directory": "path/to/git_object_directory",
                    "git_alternate_object_directories": ["path/to/git_alternate_object_directory"],
                    "gl_repository": "group/gitaly-repo",
                    "gl_project_path": "group/project-path"
                },
                "address": "address",
                "token": "token"
            },
            "git_protocol": "protocol",
            "payload": {},
            "gl_console_messages": ["console", "message"]
        })
    }

    /// Denial body with `message`
    pub fn denied_body(message: &str) -> Value {
        json!({
            "status": false,
            "message": message,
        })
    }

    /// Redirect body (sent with status 300) naming `endpoints`
    pub fn custom_action_body(endpoints: &[&str], info_message: &str) -> Value {
        json!({
            "status": true,
            "gl_id": "1",
            "payload": {
                "action": "geo_proxy_to_primary",
                "data": {
                    "api_endpoints": endpoints,
                    "gl_username": "custom",
                    "primary_repo": "https://repo/path",
                    "info_message": info_message
                }
            }
        })
    }

    /// Custom action endpoint reply whose result decodes to `output`
    pub fn custom_result_body(output: &[u8]) -> Value {
        json!({ "result": Self::encode(output) })
    }

    /// Standard padded base64
    pub fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }
}
