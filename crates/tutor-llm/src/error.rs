use thiserror::Error;

#[derive(Error, Debug)]
pub enum AIServiceError {
    #[error("AI service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI service error ({status}): {body}")]
    Remote { status: u16, body: String },

    #[error("Unsupported AI response format: {0}")]
    UnsupportedFormat(String),

    #[error("No response received from AI service")]
    EmptyResponse,

    #[error("AI response stream failed: {0}")]
    Stream(String),

    #[error("Invalid AI service configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, AIServiceError>;
