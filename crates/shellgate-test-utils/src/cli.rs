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

//! CLI command helpers for testing the shellgate binary.
//!
//! Provides convenient wrappers around assert_cmd for running `shellgate`
//! against a config file and a scripted standard input.

use assert_cmd::Command;
use std::path::Path;

/// Environment variables the binary reads; cleared so the host cannot leak in
const ISOLATED_ENV: &[&str] = &[
    "SHELLGATE_CONFIG",
    "SHELLGATE_GITLAB_URL",
    "SHELLGATE_SECRET",
    "SHELLGATE_LOG_LEVEL",
    "SHELLGATE_LOG_FORMAT",
    "SHELLGATE_LOG_FILE",
    "SHELLGATE_HTTP_USER",
    "SHELLGATE_HTTP_PASSWORD",
    "SHELLGATE_HTTP_READ_TIMEOUT",
    "SHELLGATE_STDIN_CAPTURE",
    "RUST_LOG",
];

/// Creates a new shellgate Command for testing.
///
/// # Example
/// ```ignore
/// use shellgate_test_utils::shellgate;
///
/// shellgate()
///     .args(["--config", "config.yml", "--key-id", "1", "upload-pack", "group/repo"])
///     .assert()
///     .success();
/// ```
#[allow(deprecated)] // cargo_bin is deprecated but still works for our use case
pub fn shellgate() -> Command {
    let mut cmd = Command::cargo_bin("shellgate").expect("shellgate binary not found");
    for name in ISOLATED_ENV {
        cmd.env_remove(name);
    }
    cmd
}

/// Fluent API wrapper for common shellgate invocations.
pub struct ShellgateCommand {
    cmd: Command,
}

impl ShellgateCommand {
    /// Create a new ShellgateCommand.
    pub fn new() -> Self {
        Self { cmd: shellgate() }
    }

    /// Use the given config file.
    pub fn config(mut self, path: &Path) -> Self {
        self.cmd.arg("--config").arg(path);
        self
    }

    /// Identify the session by SSH key id.
    pub fn key_id(mut self, id: &str) -> Self {
        self.cmd.arg("--key-id").arg(id);
        self
    }

    /// Identify the session by username.
    pub fn username(mut self, name: &str) -> Self {
        self.cmd.arg("--username").arg(name);
        self
    }

    /// Add multiple arguments to the command.
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Feed `input` to the command's standard input.
    pub fn stdin(mut self, input: &str) -> Self {
        self.cmd.write_stdin(input);
        self
    }

    /// Execute the command and assert success.
    pub fn run_success(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().success()
    }

    /// Execute the command and assert failure.
    pub fn run_failure(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().failure()
    }

    /// Get the underlying Command for custom assertions.
    pub fn into_inner(self) -> Command {
        self.cmd
    }
}

impl Default for ShellgateCommand {
    fn default() -> Self {
        Self::new()
    }
}
