pub mod chat;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod state;

pub use chat::{ChatController, ChatSettings, FALLBACK_REPLY};
pub use config::Config;
pub use error::{AppError, Result};
pub use form::{FormErrors, NewStudentForm, ValidStudent};
pub use state::{AppState, ThreadPreview};
