use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tutor_types::StudentContext;

use crate::error::Result;
use crate::streaming::{assemble, AssistantReply};

/// Per-delta observer, called in arrival order while a reply streams in
pub type ChunkCallback<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Trait for the remote assistant that produces lesson-planning replies
///
/// Implementations only perform the transport call; normalizing the reply
/// into a single string is shared by every client through `generate_response`.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Perform one remote invocation and classify the reply
    async fn send(&self, request: ChatRequest) -> Result<AssistantReply>;

    /// Fully assembled reply text, surfacing deltas to `on_chunk` as they arrive
    async fn generate_response(
        &self,
        request: ChatRequest,
        on_chunk: Option<ChunkCallback<'_>>,
    ) -> Result<String> {
        tracing::debug!(
            client = self.name(),
            student = %request.student_context.name,
            "Generating AI response"
        );
        let reply = self.send(request).await?;
        assemble(reply, on_chunk).await
    }

    /// Human-readable name of this client implementation
    fn name(&self) -> &str;
}

/// Request body accepted by the hosted AI function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "studentContext")]
    pub student_context: StudentContext,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, student_context: StudentContext) -> Self {
        Self {
            message: message.into(),
            student_context,
        }
    }
}
