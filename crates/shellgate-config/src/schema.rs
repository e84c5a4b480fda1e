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
//! Configuration schema.
//!
//! Every section is defaulted so a minimal file only needs `gitlab_url`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default name of the shared secret file, relative to the config directory
pub const DEFAULT_SECRET_FILE: &str = ".gitlab_shell_secret";

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the internal authorization API
    #[serde(default)]
    pub gitlab_url: String,

    /// Shared secret sent with every internal API request.
    ///
    /// When unset, the loader fills it from `secret_file`.
    #[serde(default, skip_serializing)]
    pub secret: Option<String>,

    /// File holding the shared secret
    #[serde(default)]
    pub secret_file: Option<PathBuf>,

    /// HTTP client settings
    #[serde(default)]
    pub http_settings: HttpSettings,

    /// Log file path; logs go to stderr when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Custom action behaviour
    #[serde(default)]
    pub custom_action: CustomActionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gitlab_url: String::new(),
            secret: None,
            secret_file: None,
            http_settings: HttpSettings::default(),
            log_file: None,
            log_level: default_log_level(),
            log_format: default_log_format(),
            custom_action: CustomActionConfig::default(),
        }
    }
}

impl Config {
    /// Create a configuration pointing at the given API base URL
    pub fn with_gitlab_url(gitlab_url: impl Into<String>) -> Self {
        Config {
            gitlab_url: gitlab_url.into(),
            ..Self::default()
        }
    }

    /// API base URL without trailing slashes
    pub fn api_base(&self) -> &str {
        self.gitlab_url.trim_end_matches('/')
    }
}

/// HTTP client settings for the internal API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpSettings {
    /// Basic auth user
    #[serde(default)]
    pub user: Option<String>,

    /// Basic auth password
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_seconds: u64,

    /// PEM file with extra root certificates
    #[serde(default)]
    pub ca_file: Option<PathBuf>,

    /// Directory of PEM files with extra root certificates
    #[serde(default)]
    pub ca_path: Option<PathBuf>,

    /// Accept certificates that do not chain to a trusted root
    #[serde(default)]
    pub self_signed_cert: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            user: None,
            password: None,
            read_timeout_seconds: default_read_timeout(),
            ca_file: None,
            ca_path: None,
            self_signed_cert: false,
        }
    }
}

impl HttpSettings {
    /// Basic auth credentials, if both halves are configured
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) if !user.is_empty() => Some((user, password)),
            _ => None,
        }
    }
}

/// How local input is captured between custom action calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdinCapture {
    /// Read one whitespace-delimited token
    #[default]
    Token,
    /// Read until end of stream.
    ///
    /// The read only returns once the client closes its input. On a live
    /// `git push` over SSH the client keeps stdin open while it waits for
    /// the server's reply, so this mode blocks that session indefinitely.
    /// Use it only when the input is known to end before the next call,
    /// such as a scripted or piped session.
    ToEnd,
}

impl StdinCapture {
    /// Parse a capture mode name
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "token" => Some(StdinCapture::Token),
            "to_end" | "to-end" => Some(StdinCapture::ToEnd),
            _ => None,
        }
    }
}

/// Custom action settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomActionConfig {
    /// Input capture mode
    #[serde(default)]
    pub stdin_capture: StdinCapture,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_read_timeout() -> u64 {
    300
}
