use std::sync::Arc;
use tutor_types::Sender;

use crate::error::{PersistError, Result};
use crate::models::{Message, NewMessage, NewStudent, NewTeacher, NewThread, Student, Teacher, Thread};
use crate::trait_client::PersistenceClient;

/// Data access scoped to one authenticated member.
///
/// Teacher isolation is done with explicit `teacher_id` filters on every
/// query rather than backend row-level policies.
#[derive(Clone)]
pub struct DatabaseService {
    client: Arc<dyn PersistenceClient>,
    external_id: String,
}

impl DatabaseService {
    pub fn new(client: Arc<dyn PersistenceClient>, external_id: impl Into<String>) -> Self {
        Self {
            client,
            external_id: external_id.into(),
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Get-or-create the teacher row for this member. Idempotent.
    pub async fn ensure_teacher(&self, email: &str, name: Option<&str>) -> Result<Teacher> {
        if let Some(existing) = self.client.find_teacher(&self.external_id).await? {
            tracing::debug!(teacher_id = %existing.id, "Teacher already exists");
            return Ok(existing);
        }

        let new_teacher = NewTeacher {
            external_id: self.external_id.clone(),
            email: Some(email.to_string()),
            name: name.map(str::to_string),
        };

        match self.client.insert_teacher(new_teacher).await {
            Ok(teacher) => {
                tracing::info!(teacher_id = %teacher.id, "Created teacher");
                Ok(teacher)
            }
            Err(PersistError::Conflict(reason)) => {
                // Another session created the row between our read and insert
                tracing::warn!(%reason, "Teacher insert raced, re-reading");
                self.client
                    .find_teacher(&self.external_id)
                    .await?
                    .ok_or_else(|| PersistError::TeacherNotFound(self.external_id.clone()))
            }
            Err(e) => Err(e),
        }
    }

    /// All threads of the current teacher with their student and messages,
    /// messages in ascending creation order
    pub async fn get_threads_with_students_and_messages(&self) -> Result<Vec<Thread>> {
        let teacher = self.current_teacher().await?;

        let mut threads = self.client.list_threads(&teacher.id).await?;
        for thread in &mut threads {
            thread.sort_messages();
        }

        tracing::debug!(count = threads.len(), "Loaded threads");
        Ok(threads)
    }

    pub async fn create_student(
        &self,
        name: &str,
        grade: &str,
        interests: Vec<String>,
    ) -> Result<Student> {
        let teacher = self.current_teacher().await?;

        let student = self
            .client
            .insert_student(NewStudent {
                teacher_id: teacher.id,
                name: name.to_string(),
                grade: grade.to_string(),
                interests,
            })
            .await?;

        tracing::info!(student_id = %student.id, "Created student");
        Ok(student)
    }

    /// New empty thread for `student_id`
    pub async fn create_thread(&self, student_id: &str) -> Result<Thread> {
        let teacher = self.current_teacher().await?;

        let mut thread = self
            .client
            .insert_thread(NewThread {
                teacher_id: teacher.id,
                student_id: student_id.to_string(),
            })
            .await?;
        thread.messages.clear();

        tracing::info!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    pub async fn add_message(&self, thread_id: &str, content: &str, sender: Sender) -> Result<Message> {
        self.client
            .insert_message(NewMessage {
                thread_id: thread_id.to_string(),
                content: content.to_string(),
                sender,
            })
            .await
    }

    async fn current_teacher(&self) -> Result<Teacher> {
        self.client
            .find_teacher(&self.external_id)
            .await?
            .ok_or_else(|| PersistError::TeacherNotFound(self.external_id.clone()))
    }
}
