use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{Message, NewMessage, NewStudent, NewTeacher, NewThread, Student, Teacher, Thread};
use crate::trait_client::PersistenceClient;

#[derive(Debug, Clone)]
struct ThreadRow {
    id: String,
    teacher_id: String,
    student_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    teachers: Vec<Teacher>,
    students: Vec<Student>,
    threads: Vec<ThreadRow>,
    messages: Vec<Message>,
}

impl Tables {
    fn join_thread(&self, row: &ThreadRow) -> Result<Thread> {
        let student = self
            .students
            .iter()
            .find(|s| s.id == row.student_id)
            .cloned()
            .ok_or_else(|| PersistError::NotFound(format!("student {}", row.student_id)))?;

        let messages = self
            .messages
            .iter()
            .filter(|m| m.thread_id == row.id)
            .cloned()
            .collect();

        Ok(Thread {
            id: row.id.clone(),
            teacher_id: row.teacher_id.clone(),
            student_id: row.student_id.clone(),
            created_at: row.created_at,
            student,
            messages,
        })
    }
}

/// In-process store with the same constraints as the hosted tables
/// (unique member id, foreign keys). Used offline and in tests.
#[derive(Debug, Default)]
pub struct MemoryPersistenceClient {
    tables: RwLock<Tables>,
}

impl MemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn teacher_count(&self) -> usize {
        self.tables.read().await.teachers.len()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl PersistenceClient for MemoryPersistenceClient {
    async fn find_teacher(&self, external_id: &str) -> Result<Option<Teacher>> {
        let tables = self.tables.read().await;
        Ok(tables
            .teachers
            .iter()
            .find(|t| t.external_id == external_id)
            .cloned())
    }

    async fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher> {
        let mut tables = self.tables.write().await;

        if tables.teachers.iter().any(|t| t.external_id == teacher.external_id) {
            return Err(PersistError::Conflict(format!(
                "teacher with memberstack_id {} already exists",
                teacher.external_id
            )));
        }

        let now = Utc::now();
        let record = Teacher {
            id: new_id(),
            external_id: teacher.external_id,
            email: teacher.email,
            name: teacher.name,
            created_at: now,
            updated_at: now,
        };
        tables.teachers.push(record.clone());
        Ok(record)
    }

    async fn insert_student(&self, student: NewStudent) -> Result<Student> {
        let mut tables = self.tables.write().await;

        if !tables.teachers.iter().any(|t| t.id == student.teacher_id) {
            return Err(PersistError::NotFound(format!("teacher {}", student.teacher_id)));
        }

        let record = Student {
            id: new_id(),
            teacher_id: student.teacher_id,
            name: student.name,
            grade: student.grade,
            interests: student.interests,
            created_at: Utc::now(),
        };
        tables.students.push(record.clone());
        Ok(record)
    }

    async fn insert_thread(&self, thread: NewThread) -> Result<Thread> {
        let mut tables = self.tables.write().await;

        if !tables.teachers.iter().any(|t| t.id == thread.teacher_id) {
            return Err(PersistError::NotFound(format!("teacher {}", thread.teacher_id)));
        }

        let row = ThreadRow {
            id: new_id(),
            teacher_id: thread.teacher_id,
            student_id: thread.student_id,
            created_at: Utc::now(),
        };
        let joined = tables.join_thread(&row)?;
        tables.threads.push(row);
        Ok(joined)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        let mut tables = self.tables.write().await;

        if !tables.threads.iter().any(|t| t.id == message.thread_id) {
            return Err(PersistError::NotFound(format!("thread {}", message.thread_id)));
        }

        let record = Message {
            id: new_id(),
            thread_id: message.thread_id,
            content: message.content,
            sender: message.sender,
            created_at: Utc::now(),
        };
        tables.messages.push(record.clone());
        Ok(record)
    }

    async fn list_threads(&self, teacher_id: &str) -> Result<Vec<Thread>> {
        let tables = self.tables.read().await;

        // Newest first; ties resolved by insertion order, latest first
        let mut rows: Vec<&ThreadRow> = tables
            .threads
            .iter()
            .rev()
            .filter(|t| t.teacher_id == teacher_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        rows.into_iter().map(|row| tables.join_thread(row)).collect()
    }

    fn name(&self) -> &str {
        "memory"
    }
}
