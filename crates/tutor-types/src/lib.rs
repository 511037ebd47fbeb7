pub mod context;
pub mod events;
pub mod task;

pub use context::{Sender, StudentContext};
pub use events::{ChatEvent, Notice, NoticeLevel};
pub use task::DeferredTask;
