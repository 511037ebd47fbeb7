pub mod builder;
pub mod dbs;
pub mod error;
pub mod models;
pub mod service;
pub mod trait_client;

pub use builder::PersistClientBuilder;
pub use dbs::memory::MemoryPersistenceClient;
pub use dbs::postgrest::PostgrestClient;
pub use error::{PersistError, Result};
pub use models::{Message, NewMessage, NewStudent, NewTeacher, NewThread, Student, Teacher, Thread};
pub use service::DatabaseService;
pub use trait_client::PersistenceClient;
pub use tutor_types::Sender;
