pub mod bypass;
pub mod error;
pub mod session;
pub mod widget;

pub use bypass::BypassWidget;
pub use error::{AuthError, Result};
pub use session::{AuthConfig, AuthSession, AuthState};
pub use widget::{AuthUser, AuthWidget};
