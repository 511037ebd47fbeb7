use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Message, NewMessage, NewStudent, NewTeacher, NewThread, Student, Teacher, Thread};

/// Trait for database persistence operations
///
/// Implementations provide backend-specific create/read operations. Each
/// method is a single round trip; backend errors are returned unchanged.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Look up a teacher by auth-provider member id
    async fn find_teacher(&self, external_id: &str) -> Result<Option<Teacher>>;

    /// Insert a teacher. Fails with `PersistError::Conflict` if the member id is taken.
    async fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher>;

    async fn insert_student(&self, student: NewStudent) -> Result<Student>;

    /// Insert a thread and return it joined with its student
    async fn insert_thread(&self, thread: NewThread) -> Result<Thread>;

    async fn insert_message(&self, message: NewMessage) -> Result<Message>;

    /// Threads of a teacher with student and messages embedded, newest thread first.
    /// Message order is whatever the backend returns.
    async fn list_threads(&self, teacher_id: &str) -> Result<Vec<Thread>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
