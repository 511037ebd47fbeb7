use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error ({status}): {message}")]
    Backend {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Teacher not found: {0}")]
    TeacherNotFound(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;
