pub mod buffer_utils;
pub mod config;
pub mod edge_function;
pub mod error;
pub mod simulated;
pub mod streaming;
pub mod traits;

pub use traits::{AssistantClient, ChatRequest, ChunkCallback};

pub use config::{AssistantConfig, EdgeFunctionConfig, SimulatedConfig};
pub use edge_function::EdgeFunctionClient;
pub use error::{AIServiceError, Result};
pub use simulated::SimulatedAssistant;
pub use streaming::{assemble, parse_delta_stream, AssistantReply, ByteStream, StreamEvent};
pub use tutor_types::StudentContext;
