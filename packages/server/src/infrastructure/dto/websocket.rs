//! WebSocket frame DTOs.
//!
//! Inbound and outbound frames are UTF-8 JSON text of the form
//! `{"message": "<string>"}`. Any other inbound shape is a decode error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Inbound chat frame sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InboundChatMessage {
    pub message: String,
}

/// Outbound chat frame delivered to every member of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundChatMessage {
    pub message: String,
}

/// Inbound frame decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame is not a `{"message": "<string>"}` JSON object
    #[error("Malformed chat frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The frame is not a text frame
    #[error("Unsupported frame type: {0}")]
    UnsupportedFrame(&'static str),
}

/// Decode an inbound text frame.
///
/// The frame must be a JSON object; serde would otherwise also accept the
/// sequence form `["hi"]` for a struct.
pub fn decode_inbound(text: &str) -> Result<InboundChatMessage, DecodeError> {
    let object: Map<String, Value> = serde_json::from_str(text)?;
    Ok(serde_json::from_value(Value::Object(object))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_frame() {
        // テスト項目: {"message": "..."} 形式のフレームをデコードできる
        // given (前提条件):
        let text = r#"{"message":"hi"}"#;

        // when (操作):
        let result = decode_inbound(text);

        // then (期待する結果):
        assert_eq!(
            result.unwrap(),
            InboundChatMessage {
                message: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        // テスト項目: 想定外の形式のフレームは全て DecodeError になる
        // given (前提条件):
        let frames = [
            "not-json",
            "",
            r#"{}"#,
            r#"{"message": 42}"#,
            r#"{"message": null}"#,
            r#"["hi"]"#,
            r#""hi""#,
            r#"{"message": "hi", "extra": true}"#,
            r#"{"text": "hi"}"#,
        ];

        // when (操作) / then (期待する結果):
        for frame in frames {
            assert!(
                matches!(decode_inbound(frame), Err(DecodeError::Malformed(_))),
                "frame should be rejected: {frame}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_sequence_form() {
        // テスト項目: フィールド順の配列形式はオブジェクトとして扱われず DecodeError になる
        // given (前提条件):
        let frames = [r#"["hi"]"#, r#"[]"#, r#"[{"message":"hi"}]"#];

        // when (操作) / then (期待する結果):
        for frame in frames {
            assert!(
                matches!(decode_inbound(frame), Err(DecodeError::Malformed(_))),
                "sequence frame should be rejected: {frame}"
            );
        }
    }

    #[test]
    fn test_outbound_wire_format() {
        // テスト項目: 送信フレームは {"message": "..."} のみを含む
        // given (前提条件):
        let outbound = OutboundChatMessage {
            message: "hi \"there\"".to_string(),
        };

        // when (操作):
        let json = serde_json::to_string(&outbound).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"message":"hi \"there\""}"#);
    }
}
