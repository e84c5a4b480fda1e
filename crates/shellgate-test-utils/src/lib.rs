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

//! # Shellgate Test Utilities
//!
//! Shared test utilities for shellgate crates providing:
//! - A fake internal API server that records every request it receives
//! - JSON fixtures for the authorization and custom action exchanges
//! - CLI command helpers for testing the `shellgate` binary
//! - Assertions over recorded requests and console output

pub mod assertions;
pub mod cli;
pub mod fixtures;
pub mod server;

// Re-export commonly used items at crate root
pub use assertions::*;
pub use cli::{shellgate, ShellgateCommand};
pub use fixtures::TestFixtures;
pub use server::{CapturedRequest, TestServer};
