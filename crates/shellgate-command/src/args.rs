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

use shellgate_api::Identity;

use crate::error::{CommandError, CommandResult};

/// Identity arguments as handed over by the shell front end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    pub key_id: Option<String>,
    pub username: Option<String>,
}

impl CommandArgs {
    /// The identity to authorize; a username wins over a key id
    pub fn identity(&self) -> CommandResult<Identity> {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        match (non_empty(&self.username), non_empty(&self.key_id)) {
            (Some(username), _) => Ok(Identity::Username(username)),
            (None, Some(key_id)) => Ok(Identity::KeyId(key_id)),
            (None, None) => Err(CommandError::MissingIdentity),
        }
    }
}
