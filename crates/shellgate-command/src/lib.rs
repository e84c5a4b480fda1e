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

//! Session-side orchestration of the shellgate access gateway
//!
//! A session first asks the internal API whether its identity may run the
//! requested git command ([`AccessVerifier`]). The answer either forwards
//! the session to the transfer backend or, for pushes, redirects it through
//! a server-directed sequence of HTTP calls ([`CustomActionDispatcher`]).
//! [`SessionCommand`] ties both together over a [`ReadWriter`].
//!
//! # Example
//!
//! ```rust,no_run
//! use shellgate_api::{CommandType, Identity};
//! use shellgate_command::{ReadWriter, SessionCommand, SessionOutcome};
//! use shellgate_config::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::with_gitlab_url("http://localhost:8080");
//! let command = SessionCommand::from_config(&config, Identity::KeyId("1".into()))?;
//!
//! let mut rw = ReadWriter::new(tokio::io::stdin(), tokio::io::stdout());
//! match command.execute(CommandType::UploadPack, "group/repo", &mut rw).await? {
//!     SessionOutcome::Forward(transfer) => println!("forward to {}", transfer.address),
//!     SessionOutcome::Completed => {}
//! }
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod args;
pub mod console;
pub mod custom_action;
pub mod error;
pub mod readwriter;
pub mod session;

pub use access::AccessVerifier;
pub use args::CommandArgs;
pub use console::CONSOLE_PREFIX;
pub use custom_action::{Carry, CustomActionDispatcher};
pub use error::{CommandError, CommandResult};
pub use readwriter::ReadWriter;
pub use session::{SessionCommand, SessionOutcome, TransferRequest};
