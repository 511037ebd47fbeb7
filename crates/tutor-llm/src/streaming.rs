use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::pin::Pin;

use crate::buffer_utils::{parse_sse_stream, SseLineParser};
use crate::error::{AIServiceError, Result};
use crate::traits::ChunkCallback;

/// Raw reply body as delivered by the transport
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text fragment
    Delta {
        content: String,
    },

    /// `[DONE]` sentinel was seen. Optional and not necessarily last.
    Done,
}

/// Reply shape decided at the transport boundary from the declared content type
pub enum AssistantReply {
    /// Whole-payload reply
    Text(String),

    /// Newline-delimited `data: ` events
    Stream(ByteStream),
}

impl AssistantReply {
    /// Classify a JSON body: a bare string or an object carrying `response`
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(AssistantReply::Text(text)),
            Value::Object(mut map) => match map.remove("response") {
                Some(Value::String(text)) if !text.is_empty() => Ok(AssistantReply::Text(text)),
                Some(Value::String(_)) | Some(Value::Null) => Err(AIServiceError::EmptyResponse),
                Some(other) => Err(AIServiceError::UnsupportedFormat(format!(
                    "`response` field is not a string: {}",
                    other
                ))),
                None => Err(AIServiceError::UnsupportedFormat(
                    "JSON object without a `response` field".to_string(),
                )),
            },
            Value::Null => Err(AIServiceError::EmptyResponse),
            other => Err(AIServiceError::UnsupportedFormat(format!(
                "unexpected JSON value: {}",
                other
            ))),
        }
    }
}

impl fmt::Debug for AssistantReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistantReply::Text(text) => f.debug_tuple("Text").field(text).finish(),
            AssistantReply::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Parses `{"delta": "..."}` payloads, falling back to the raw text when the
/// payload is not JSON at all
pub struct DeltaLineParser;

impl SseLineParser for DeltaLineParser {
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>> {
        match serde_json::from_str::<Value>(data) {
            Ok(value) => match value.get("delta").and_then(Value::as_str) {
                Some(delta) if !delta.is_empty() => Ok(vec![StreamEvent::Delta {
                    content: delta.to_string(),
                }]),
                _ => {
                    tracing::debug!(data, "Ignoring data line without delta");
                    Ok(Vec::new())
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable stream payload, using raw text as delta");
                Ok(vec![StreamEvent::Delta {
                    content: data.to_string(),
                }])
            }
        }
    }
}

/// Decode a chunked reply body into delta events
pub fn parse_delta_stream<S, B, E>(
    bytes: S,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    parse_sse_stream(bytes, DeltaLineParser)
}

/// Normalize any reply shape into the final text.
///
/// Streams are read sequentially to exhaustion; each delta is appended and
/// forwarded to `on_chunk` before the next one is read. A stream that never
/// yields a delta assembles to an empty string.
pub async fn assemble(reply: AssistantReply, mut on_chunk: Option<ChunkCallback<'_>>) -> Result<String> {
    let bytes = match reply {
        AssistantReply::Text(text) => return Ok(text),
        AssistantReply::Stream(bytes) => bytes,
    };

    let mut events = parse_delta_stream(bytes);
    let mut full_response = String::new();
    let mut deltas = 0usize;

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Delta { content } => {
                full_response.push_str(&content);
                deltas += 1;
                if let Some(callback) = on_chunk.as_deref_mut() {
                    callback(&content);
                }
            }
            StreamEvent::Done => tracing::debug!("Received [DONE] sentinel"),
        }
    }

    tracing::debug!(deltas, length = full_response.len(), "AI streaming response complete");
    Ok(full_response)
}
