use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::streaming::AssistantReply;
use crate::traits::{AssistantClient, ChatRequest};

pub const DEFAULT_SIMULATED_DELAY_MS: u64 = 1500;

/// Offline stand-in for the hosted function: waits, then answers with a canned
/// reply addressed to the student
pub struct SimulatedAssistant {
    delay: Duration,
}

impl SimulatedAssistant {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedAssistant {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SIMULATED_DELAY_MS))
    }
}

#[async_trait]
impl AssistantClient for SimulatedAssistant {
    async fn send(&self, request: ChatRequest) -> Result<AssistantReply> {
        tokio::time::sleep(self.delay).await;

        Ok(AssistantReply::Text(format!(
            "I'm processing your request and will provide a personalized lesson plan based on {}'s profile. \
             This is a simulated response; connect the AI endpoint for curriculum-aware suggestions.",
            request.student_context.name
        )))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_types::StudentContext;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_reply_mentions_student() {
        let assistant = SimulatedAssistant::default();
        let request = ChatRequest::new(
            "Plan a lesson",
            StudentContext::new("Alex", "5th", vec!["Science".to_string()]),
        );

        let reply = assistant.generate_response(request, None).await.unwrap();
        assert!(reply.contains("Alex's profile"));
    }
}
