//! Wire types of the custom action protocol.
//!
//! Each endpoint named by a redirect payload receives the payload data plus
//! the base64 of the local input captured since the previous call, and
//! answers with base64 result bytes to show to the session.

use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, Engine};
use serde::{Deserialize, Serialize};

use crate::access::{null_default, CustomPayloadData};

/// Body sent to each custom action endpoint
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomActionRequest {
    /// Payload data with the authorized user id filled in
    pub data: CustomPayloadData,
    /// Base64 of the input captured after the previous call; empty on the first
    pub output: String,
}

/// Body returned by a custom action endpoint
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CustomActionResponse {
    /// Base64 result bytes
    #[serde(deserialize_with = "null_default")]
    pub result: String,
    #[serde(deserialize_with = "null_default")]
    pub message: String,
}

impl CustomActionResponse {
    /// Decode the result bytes
    pub fn decode_result(&self) -> Result<Vec<u8>, DecodeError> {
        decode(&self.result)
    }
}

/// Standard base64 with padding, as carried in `output` and `result`
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Inverse of [`encode`]
pub fn decode(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(encoded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_result() {
        let response: CustomActionResponse =
            serde_json::from_str(r#"{"result":"Y3VzdG9t"}"#).unwrap();
        assert_eq!(response.decode_result().unwrap(), b"custom");
        assert_eq!(response.message, "");
    }

    #[test]
    fn test_decode_invalid_result() {
        let response = CustomActionResponse {
            result: "not base64!".into(),
            message: String::new(),
        };
        assert!(response.decode_result().is_err());
    }

    #[test]
    fn test_empty_output_encodes_to_empty_string() {
        assert_eq!(encode(b""), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    proptest! {
        #[test]
        fn base64_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
        }
    }
}
