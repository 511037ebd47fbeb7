use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;

use super::buffering::CircularLineBuffer;
use crate::error::{AIServiceError, Result};
use crate::streaming::StreamEvent;

const DATA_PREFIX: &str = "data: ";

/// Strategy pattern for parsing different SSE payload shapes
pub trait SseLineParser: Send {
    /// Parse a data line (prefix already stripped) into stream events
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>>;

    /// Check if this line signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Generic SSE stream parser using circular buffer.
///
/// Lines without the `data: ` prefix are ignored. The done marker is reported
/// as [`StreamEvent::Done`] but does not stop reading; the stream ends when
/// the underlying byte source is exhausted.
pub fn parse_sse_stream<S, B, E, P>(
    bytes: S,
    parser: P,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = CircularLineBuffer::with_capacity(4096);
        let mut failed = false;

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(chunk) => {
                    buffer.extend(chunk.as_ref());

                    // Process all complete lines in buffer
                    while let Some(line) = buffer.next_line() {
                        for item in parse_line(&parser, &line) {
                            yield item;
                        }
                    }
                }
                Err(e) => {
                    failed = true;
                    yield Err(AIServiceError::Stream(e.to_string()));
                    break;
                }
            }
        }

        if !failed {
            if let Some(line) = buffer.take_remaining() {
                for item in parse_line(&parser, &line) {
                    yield item;
                }
            }
        }
    })
}

fn parse_line<P: SseLineParser>(parser: &P, line: &str) -> Vec<Result<StreamEvent>> {
    if line.trim().is_empty() {
        return Vec::new();
    }

    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        tracing::trace!(line, "Skipping non-data SSE line");
        return Vec::new();
    };

    if parser.is_done_marker(data) {
        return vec![Ok(StreamEvent::Done)];
    }

    match parser.parse_data_line(data) {
        Ok(events) => events.into_iter().map(Ok).collect(),
        Err(e) => vec![Err(e)],
    }
}
