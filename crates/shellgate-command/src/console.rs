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

//! Console message rendering.

use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Prefix of every server message shown to the session
pub const CONSOLE_PREFIX: &str = "> GitLab: ";

/// Render `messages`, one prefixed line each
pub fn format_console_messages(messages: &[String]) -> String {
    messages
        .iter()
        .map(|message| format!("{}{}\n", CONSOLE_PREFIX, message))
        .collect()
}

/// Write all `messages` in one go; nothing is written for an empty list
pub async fn display_console_messages<W>(out: &mut W, messages: &[String]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let rendered = format_console_messages(messages);
    if rendered.is_empty() {
        return Ok(());
    }

    out.write_all(rendered.as_bytes()).await?;
    out.flush().await
}

/// Write a single message unless it is empty
pub async fn display_info_message<W>(out: &mut W, message: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if message.is_empty() {
        return Ok(());
    }

    out.write_all(format!("{}{}\n", CONSOLE_PREFIX, message).as_bytes())
        .await?;
    out.flush().await
}
