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

//! Status output for the shellgate binary.
//!
//! Standard output carries the git session stream, so everything here goes
//! to standard error.
//!
//! # Examples
//!
//! ```rust,ignore
//! output::error("Not allowed!");
//! output::info("Forwarding git-upload-pack for group/repo");
//! output::detail("Address", "tcp://gitaly:8075");
//! ```

use console::style;

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{}", style(msg).for_stderr().red().bold());
}

/// Print an informational message.
pub fn info(msg: &str) {
    eprintln!("{} {}", style("»").for_stderr().cyan(), msg);
}

/// Print a detail line with key-value formatting.
///
/// The value is highlighted in cyan.
pub fn detail(key: &str, value: &str) {
    eprintln!("  {}: {}", key, style(value).for_stderr().cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_functions_compile() {
        let _ = error;
        let _ = info;
        let _ = detail;
    }
}
