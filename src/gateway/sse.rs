//! Incremental parser for the gateway's SSE-style reply stream.
//!
//! The /api/send body is newline-delimited text where lines prefixed
//! with `data: ` carry one JSON event each. Chunks arrive at arbitrary
//! boundaries, so the parser buffers partial lines until the rest of
//! the line shows up. Anything that is not a well-formed data line is
//! skipped, never fatal.

use serde::{Deserialize, Serialize};

const DATA_PREFIX: &str = "data: ";

/// One event from the gateway's reply stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Thinking {
        #[serde(default)]
        content: String,
    },
    Text {
        #[serde(default)]
        content: String,
    },
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    ToolResult {
        #[serde(default)]
        id: String,
        #[serde(default)]
        output: String,
        #[serde(default)]
        is_error: bool,
    },
    Usage {
        #[serde(default)]
        input_tokens: i32,
        #[serde(default)]
        output_tokens: i32,
    },
    Done {
        full_response: Option<String>,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    /// Any tag this runner does not know. Kept in the event sequence so
    /// counts stay honest, asserted on by nobody.
    #[serde(other)]
    Unknown,
}

/// Final aggregated text: the last done event that actually carried one.
pub fn final_response(events: &[StreamEvent]) -> Option<&str> {
    events.iter().rev().find_map(|event| match event {
        StreamEvent::Done {
            full_response: Some(text),
        } => Some(text.as_str()),
        _ => None,
    })
}

/// Line-accumulating state machine over raw body chunks.
pub struct SseParser {
    buf: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Consume one chunk, returning the events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(event) = parse_line(&line[..pos]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a final line left without a trailing newline.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let line = std::mem::take(&mut self.buf);
        parse_line(&line)
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_line(raw: &[u8]) -> Option<StreamEvent> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches('\r');

    // Blank lines, comments and non-data fields are part of the framing,
    // not payload.
    let payload = line.strip_prefix(DATA_PREFIX)?;

    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            log::debug!("skipping unparseable stream line {:?}: {}", line, e);
            None
        }
    }
}
