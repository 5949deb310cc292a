//! JSON codec used for request and response bodies

use crate::error::Result;
use serde_json::Value;

/// Encodes request bodies and decodes response bodies
pub trait Codec: Send + Sync {
    /// Serialize a value into a request payload
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Parse a response payload
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

/// [`Codec`] backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod codec_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decoded_page_reencodes_to_same_structure() {
        let codec = JsonCodec;
        let raw = br#"{"images":[{"id":"a","tags":[]}],"next":"/v2/images?marker=a"}"#;

        let decoded = codec.decode(raw).unwrap();
        let reencoded = codec.encode(&decoded).unwrap();

        assert_eq!(codec.decode(&reencoded).unwrap(), decoded);
        assert_eq!(decoded["images"][0]["id"], json!("a"));
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(JsonCodec.decode(b"not json").is_err());
    }
}
