use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Auth widget error: {0}")]
    Widget(String),

    #[error("Auth widget is not initialized")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, AuthError>;
