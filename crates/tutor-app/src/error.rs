use thiserror::Error;
use tutor_persist::PersistError;

use crate::form::FormErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("No thread is selected")]
    NoActiveThread,

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Invalid student: {0}")]
    InvalidForm(#[from] FormErrors),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub type Result<T> = std::result::Result<T, AppError>;
