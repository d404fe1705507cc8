//! Base64 JSON codec for story files.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shared_types::StoryRecord;

use super::error::{StoreError, StoreResult};

/// Serialize as indented JSON, then base64-encode.
pub fn encode(record: &StoryRecord) -> StoreResult<String> {
    let json = serde_json::to_vec_pretty(record)
        .map_err(|e| StoreError::Parse(format!("failed to serialize story: {e}")))?;
    Ok(STANDARD.encode(json))
}

/// Base64-decode, then parse as a JSON object.
///
/// Whitespace is ignored, since the content store wraps base64 across lines.
pub fn decode(content_base64: &str) -> StoreResult<StoryRecord> {
    let compact: String = content_base64
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Parse(format!("invalid base64 content: {e}")))?;

    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::Parse(format!("invalid JSON content: {e}")))?;

    StoryRecord::try_from(value)
        .map_err(|_| StoreError::Parse("story content is not a JSON object".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StoryRecord {
        StoryRecord::try_from(value).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let original = record(json!({
            "title": "The Dark Woods",
            "scenes": [{"text": "It was late."}, {"text": "Something moved."}],
            "rating": 4.5,
            "draft": false,
            "author": null
        }));

        let decoded = decode(&encode(&original).unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_encoding_is_indented_and_keeps_field_order() {
        let original = record(json!({"title": "t", "body": "b"}));
        let bytes = STANDARD.decode(encode(&original).unwrap()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(text, "{\n  \"title\": \"t\",\n  \"body\": \"b\"\n}");
    }

    #[test]
    fn test_decode_accepts_line_wrapped_base64() {
        let encoded = encode(&record(json!({"title": "a fairly long title to wrap"}))).unwrap();
        let wrapped = encoded
            .as_bytes()
            .chunks(10)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");

        let decoded = decode(&format!("{wrapped}\n")).unwrap();
        assert_eq!(decoded.title(), Some("a fairly long title to wrap"));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode("not base64 at all!!").unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode(&STANDARD.encode("{\"title\": ")).unwrap_err();
        assert!(matches!(err, StoreError::Parse(msg) if msg.contains("JSON")));
    }

    #[test]
    fn test_decode_non_object_json() {
        let err = decode(&STANDARD.encode("[1, 2, 3]")).unwrap_err();
        assert!(matches!(err, StoreError::Parse(msg) if msg.contains("not a JSON object")));
    }
}
