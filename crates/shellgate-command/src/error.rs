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

use shellgate_api::ApiError;
use thiserror::Error;

/// Errors that end a session
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server refused access; carries its message verbatim
    #[error("{0}")]
    Denied(String),

    #[error("Custom action error: Empty Api endpoints")]
    EmptyEndpoints,

    #[error("Custom action error: invalid result encoding: {0}")]
    ResultDecoding(#[from] base64::DecodeError),

    #[error("no gitaly_address given")]
    MissingTransferAddress,

    #[error("either a key id or a username is required")]
    MissingIdentity,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for session commands
pub type CommandResult<T> = Result<T, CommandError>;
