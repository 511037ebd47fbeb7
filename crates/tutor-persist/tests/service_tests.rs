use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tutor_persist::{
    DatabaseService, MemoryPersistenceClient, Message, NewMessage, NewStudent, NewTeacher, NewThread,
    PersistError, PersistenceClient, Sender, Student, Teacher, Thread,
};

fn service(client: Arc<MemoryPersistenceClient>) -> DatabaseService {
    DatabaseService::new(client, "mem_test_123")
}

#[tokio::test]
async fn test_ensure_teacher_is_idempotent() {
    let client = Arc::new(MemoryPersistenceClient::new());
    let db = service(client.clone());

    let first = db.ensure_teacher("teacher@test.com", Some("Test Teacher")).await.unwrap();
    let second = db.ensure_teacher("teacher@test.com", Some("Test Teacher")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(client.teacher_count().await, 1);
    assert_eq!(first.external_id, "mem_test_123");
    assert_eq!(first.email.as_deref(), Some("teacher@test.com"));
}

#[tokio::test]
async fn test_scoped_operations_require_teacher() {
    let db = service(Arc::new(MemoryPersistenceClient::new()));

    let result = db.create_student("Alex", "5th", vec!["Science".to_string()]).await;
    assert!(matches!(result, Err(PersistError::TeacherNotFound(_))));

    let result = db.get_threads_with_students_and_messages().await;
    assert!(matches!(result, Err(PersistError::TeacherNotFound(_))));
}

#[tokio::test]
async fn test_end_to_end_thread_lifecycle() {
    let db = service(Arc::new(MemoryPersistenceClient::new()));
    db.ensure_teacher("teacher@test.com", None).await.unwrap();

    let student = db
        .create_student("Alex", "5th", vec!["Science".to_string()])
        .await
        .unwrap();
    assert_eq!(student.interests, vec!["Science".to_string()]);

    let thread = db.create_thread(&student.id).await.unwrap();
    assert!(thread.messages.is_empty());
    assert_eq!(thread.student.name, "Alex");

    db.add_message(&thread.id, "Hello", Sender::Teacher).await.unwrap();
    db.add_message(&thread.id, "Hi", Sender::Ai).await.unwrap();

    let threads = db.get_threads_with_students_and_messages().await.unwrap();
    assert_eq!(threads.len(), 1);

    let contents: Vec<(&str, Sender)> = threads[0]
        .messages
        .iter()
        .map(|m| (m.content.as_str(), m.sender))
        .collect();
    assert_eq!(contents, vec![("Hello", Sender::Teacher), ("Hi", Sender::Ai)]);
}

#[tokio::test]
async fn test_threads_are_listed_newest_first() {
    let db = service(Arc::new(MemoryPersistenceClient::new()));
    db.ensure_teacher("teacher@test.com", None).await.unwrap();

    let first = db.create_student("Alex", "5th", vec!["Science".to_string()]).await.unwrap();
    let second = db.create_student("Sam", "3rd", vec!["Art".to_string()]).await.unwrap();
    db.create_thread(&first.id).await.unwrap();
    db.create_thread(&second.id).await.unwrap();

    let threads = db.get_threads_with_students_and_messages().await.unwrap();
    let names: Vec<&str> = threads.iter().map(|t| t.student.name.as_str()).collect();
    assert_eq!(names, vec!["Sam", "Alex"]);
}

/// Backend that hands back messages newest-first
struct UnorderedBackend {
    teacher: Teacher,
}

impl UnorderedBackend {
    fn new() -> Self {
        Self {
            teacher: Teacher {
                id: "teach-1".to_string(),
                external_id: "mem_test_123".to_string(),
                email: None,
                name: None,
                created_at: Utc.timestamp_opt(0, 0).unwrap(),
                updated_at: Utc.timestamp_opt(0, 0).unwrap(),
            },
        }
    }
}

fn message_at(id: &str, sender: Sender, secs: i64) -> Message {
    Message {
        id: id.to_string(),
        thread_id: "t1".to_string(),
        content: id.to_string(),
        sender,
        created_at: Utc.timestamp_opt(secs, 0).unwrap(),
    }
}

#[async_trait]
impl PersistenceClient for UnorderedBackend {
    async fn find_teacher(&self, external_id: &str) -> tutor_persist::Result<Option<Teacher>> {
        Ok((external_id == self.teacher.external_id).then(|| self.teacher.clone()))
    }

    async fn insert_teacher(&self, _teacher: NewTeacher) -> tutor_persist::Result<Teacher> {
        Err(PersistError::Conflict("exists".to_string()))
    }

    async fn insert_student(&self, _student: NewStudent) -> tutor_persist::Result<Student> {
        unimplemented!()
    }

    async fn insert_thread(&self, _thread: NewThread) -> tutor_persist::Result<Thread> {
        unimplemented!()
    }

    async fn insert_message(&self, _message: NewMessage) -> tutor_persist::Result<Message> {
        unimplemented!()
    }

    async fn list_threads(&self, teacher_id: &str) -> tutor_persist::Result<Vec<Thread>> {
        assert_eq!(teacher_id, "teach-1");
        Ok(vec![Thread {
            id: "t1".to_string(),
            teacher_id: teacher_id.to_string(),
            student_id: "s1".to_string(),
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            student: Student {
                id: "s1".to_string(),
                teacher_id: teacher_id.to_string(),
                name: "Alex".to_string(),
                grade: "5th".to_string(),
                interests: vec!["Science".to_string()],
                created_at: Utc.timestamp_opt(0, 0).unwrap(),
            },
            messages: vec![
                message_at("third", Sender::Ai, 300),
                message_at("first", Sender::Teacher, 100),
                message_at("second", Sender::Ai, 200),
            ],
        }])
    }

    fn name(&self) -> &str {
        "unordered"
    }
}

#[tokio::test]
async fn test_messages_sorted_regardless_of_backend_order() {
    let db = DatabaseService::new(Arc::new(UnorderedBackend::new()), "mem_test_123");

    let threads = db.get_threads_with_students_and_messages().await.unwrap();
    let ids: Vec<&str> = threads[0].messages.iter().map(|m| m.id.as_str()).collect();

    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_ensure_teacher_returns_existing_without_insert() {
    // insert_teacher on this backend always conflicts, so success proves it was never needed
    let db = DatabaseService::new(Arc::new(UnorderedBackend::new()), "mem_test_123");

    let teacher = db.ensure_teacher("teacher@test.com", None).await.unwrap();
    assert_eq!(teacher.id, "teach-1");
}

/// Memory store where another session registers the teacher while the
/// first lookup is in flight, so the lookup misses and the insert conflicts
struct RacingBackend {
    inner: MemoryPersistenceClient,
    raced: AtomicBool,
}

#[async_trait]
impl PersistenceClient for RacingBackend {
    async fn find_teacher(&self, external_id: &str) -> tutor_persist::Result<Option<Teacher>> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner
                .insert_teacher(NewTeacher {
                    external_id: external_id.to_string(),
                    email: Some("other@test.com".to_string()),
                    name: None,
                })
                .await?;
            return Ok(None);
        }
        self.inner.find_teacher(external_id).await
    }

    async fn insert_teacher(&self, teacher: NewTeacher) -> tutor_persist::Result<Teacher> {
        self.inner.insert_teacher(teacher).await
    }

    async fn insert_student(&self, student: NewStudent) -> tutor_persist::Result<Student> {
        self.inner.insert_student(student).await
    }

    async fn insert_thread(&self, thread: NewThread) -> tutor_persist::Result<Thread> {
        self.inner.insert_thread(thread).await
    }

    async fn insert_message(&self, message: NewMessage) -> tutor_persist::Result<Message> {
        self.inner.insert_message(message).await
    }

    async fn list_threads(&self, teacher_id: &str) -> tutor_persist::Result<Vec<Thread>> {
        self.inner.list_threads(teacher_id).await
    }

    fn name(&self) -> &str {
        "racing"
    }
}

#[tokio::test]
async fn test_ensure_teacher_rereads_after_insert_conflict() {
    let backend = Arc::new(RacingBackend {
        inner: MemoryPersistenceClient::new(),
        raced: AtomicBool::new(false),
    });
    let db = DatabaseService::new(backend.clone(), "mem_test_123");

    let teacher = db.ensure_teacher("teacher@test.com", None).await.unwrap();

    assert_eq!(teacher.external_id, "mem_test_123");
    // the row written by the other session wins
    assert_eq!(teacher.email.as_deref(), Some("other@test.com"));
    assert_eq!(backend.inner.teacher_count().await, 1);
}
