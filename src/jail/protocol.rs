//! Frame types for the jail WebSocket protocol.
//!
//! Every frame is a JSON object tagged by its `type` field. Replies the
//! server grows later still parse: an unrecognized tag lands on
//! [`ServerFrame::Unknown`] instead of failing the read.

use serde::{Deserialize, Serialize};

/// Frames this client sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Query {
        channel_id: String,
        workspace: String,
        prompt: String,
        /// None asks the server to start a fresh session.
        session_id: Option<String>,
    },
    CloseSession {
        channel_id: String,
    },
}

/// Frames the server sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Text {
        #[serde(default)]
        channel_id: String,
        #[serde(default)]
        content: String,
    },
    ToolUse {
        #[serde(default)]
        channel_id: String,
        #[serde(default)]
        name: String,
    },
    Done {
        #[serde(default)]
        channel_id: String,
    },
    Error {
        #[serde(default)]
        channel_id: String,
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl ServerFrame {
    /// Tag name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerFrame::Text { .. } => "text",
            ServerFrame::ToolUse { .. } => "tool_use",
            ServerFrame::Done { .. } => "done",
            ServerFrame::Error { .. } => "error",
            ServerFrame::Unknown => "unknown",
        }
    }

    /// Channel the frame was routed to, if it carries one.
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            ServerFrame::Text { channel_id, .. }
            | ServerFrame::ToolUse { channel_id, .. }
            | ServerFrame::Done { channel_id }
            | ServerFrame::Error { channel_id, .. } => Some(channel_id),
            ServerFrame::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_frame_wire_shape() {
        let frame = ClientFrame::Query {
            channel_id: "test-channel-123".to_string(),
            workspace: "/tmp/ws".to_string(),
            prompt: "Say hello".to_string(),
            session_id: None,
        };

        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({
                "type": "query",
                "channel_id": "test-channel-123",
                "workspace": "/tmp/ws",
                "prompt": "Say hello",
                "session_id": null,
            })
        );
    }

    #[test]
    fn test_close_session_frame_wire_shape() {
        let frame = ClientFrame::CloseSession {
            channel_id: "test-channel-456".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({ "type": "close_session", "channel_id": "test-channel-456" })
        );
    }

    #[test]
    fn test_server_frame_parses_known_kinds() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"type": "text", "channel_id": "ch", "content": "hi"}"#)
                .unwrap();
        assert_eq!(frame.kind(), "text");
        assert_eq!(frame.channel_id(), Some("ch"));

        let frame: ServerFrame =
            serde_json::from_str(r#"{"type": "error", "channel_id": "ch", "message": "bad"}"#)
                .unwrap();
        assert!(matches!(frame, ServerFrame::Error { .. }));
    }

    #[test]
    fn test_server_frame_tolerates_missing_fields() {
        let frame: ServerFrame = serde_json::from_str(r#"{"type": "done"}"#).unwrap();
        assert_eq!(frame, ServerFrame::Done { channel_id: String::new() });
    }

    #[test]
    fn test_unrecognized_kind_maps_to_unknown() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"type": "usage", "input_tokens": 3}"#).unwrap();
        assert_eq!(frame, ServerFrame::Unknown);
        assert_eq!(frame.channel_id(), None);
    }
}
