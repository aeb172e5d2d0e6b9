//! Binary-safe encoding for every field embedded in a report.
//!
//! Every value (text or raw bytes) is emitted as standard base64 with padding
//! and no line wrapping, so the embedded dataset never needs string escaping.

use base64::prelude::{BASE64_STANDARD, Engine};

/// Encode raw bytes or UTF-8 text. Empty input yields an empty string.
pub fn encode(input: impl AsRef<[u8]>) -> String {
    BASE64_STANDARD.encode(input.as_ref())
}

/// Decode a base64 string produced by [`encode`].
pub fn decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_STANDARD.decode(encoded)
}

/// Serde adapter that stores raw bytes as a base64 string.
pub mod bytes_b64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode(&s).map_err(serde::de::Error::custom)
    }
}
