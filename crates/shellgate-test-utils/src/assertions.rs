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

//! Custom assertions for test verification.

use crate::fixtures::TestFixtures;
use crate::server::CapturedRequest;

/// Assert that `output` consists of exactly `lines`, each ending in `\n`.
pub fn assert_output_lines(output: &[u8], lines: &[&str]) {
    let expected: String = lines.iter().map(|line| format!("{}\n", line)).collect();
    assert_eq!(
        String::from_utf8_lossy(output),
        expected,
        "session output should be exactly {:?}",
        lines
    );
}

/// Assert that the request carried the shared secret header for `secret`.
pub fn assert_shared_secret(request: &CapturedRequest, secret: &str) {
    assert_eq!(
        request.header("gitlab-shared-secret"),
        Some(TestFixtures::encode(secret.as_bytes()).as_str()),
        "request to {} should carry the encoded shared secret",
        request.path
    );
}

/// Assert that the request carried HTTP basic credentials.
pub fn assert_basic_auth(request: &CapturedRequest, user: &str, password: &str) {
    let expected = format!(
        "Basic {}",
        TestFixtures::encode(format!("{}:{}", user, password).as_bytes())
    );
    assert_eq!(
        request.header("authorization"),
        Some(expected.as_str()),
        "request to {} should carry basic auth for {}",
        request.path,
        user
    );
}

/// Assert that the request's JSON `output` field decodes to `input`.
pub fn assert_custom_action_output(request: &CapturedRequest, input: &[u8]) {
    assert_eq!(
        request.json()["output"],
        TestFixtures::encode(input),
        "request to {} should carry the captured input",
        request.path
    );
}
