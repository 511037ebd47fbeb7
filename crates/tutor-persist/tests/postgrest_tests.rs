use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use tutor_persist::{DatabaseService, PersistError, PostgrestClient, Sender};

const TEACHER_ROW: &str = r#"[{
    "id": "teach-1",
    "memberstack_id": "mem_1",
    "email": "teacher@test.com",
    "name": null,
    "created_at": "2024-03-01T09:00:00+00:00",
    "updated_at": "2024-03-01T09:00:00+00:00"
}]"#;

fn db(server: &mockito::ServerGuard) -> DatabaseService {
    let client = PostgrestClient::new(&server.url(), "anon-key").unwrap();
    DatabaseService::new(Arc::new(client), "mem_1")
}

#[tokio::test]
async fn test_ensure_teacher_returns_existing_row() {
    let mut server = mockito::Server::new_async().await;
    let lookup = server
        .mock("GET", "/rest/v1/teachers")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("memberstack_id".into(), "eq.mem_1".into()),
            Matcher::UrlEncoded("select".into(), "*".into()),
        ]))
        .match_header("apikey", "anon-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TEACHER_ROW)
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/rest/v1/teachers")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let teacher = db(&server).ensure_teacher("teacher@test.com", None).await.unwrap();

    assert_eq!(teacher.id, "teach-1");
    lookup.assert_async().await;
    insert.assert_async().await;
}

#[tokio::test]
async fn test_ensure_teacher_creates_missing_row() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/teachers")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/rest/v1/teachers")
        .match_query(Matcher::UrlEncoded("select".into(), "*".into()))
        .match_header("prefer", "return=representation")
        .match_body(Matcher::Json(json!({
            "memberstack_id": "mem_1",
            "email": "teacher@test.com"
        })))
        .with_status(201)
        .with_body(TEACHER_ROW)
        .create_async()
        .await;

    let teacher = db(&server).ensure_teacher("teacher@test.com", None).await.unwrap();

    assert_eq!(teacher.external_id, "mem_1");
    insert.assert_async().await;
}

#[tokio::test]
async fn test_thread_listing_sorts_messages() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/teachers")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(TEACHER_ROW)
        .create_async()
        .await;
    server
        .mock("GET", "/rest/v1/threads")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("teacher_id".into(), "eq.teach-1".into()),
            Matcher::UrlEncoded("select".into(), "*,student:students(*),messages(*)".into()),
            Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{
                "id": "t1",
                "teacher_id": "teach-1",
                "student_id": "s1",
                "created_at": "2024-03-01T10:00:00+00:00",
                "student": {
                    "id": "s1", "teacher_id": "teach-1", "name": "Alex", "grade": "5th",
                    "interests": ["Science"], "created_at": "2024-03-01T09:59:00+00:00"
                },
                "messages": [
                    {"id": "m2", "thread_id": "t1", "content": "Hi", "sender": "ai",
                     "created_at": "2024-03-01T10:02:00+00:00"},
                    {"id": "m1", "thread_id": "t1", "content": "Hello", "sender": "teacher",
                     "created_at": "2024-03-01T10:01:00+00:00"}
                ]
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let threads = db(&server).get_threads_with_students_and_messages().await.unwrap();

    let contents: Vec<(&str, Sender)> = threads[0]
        .messages
        .iter()
        .map(|m| (m.content.as_str(), m.sender))
        .collect();
    assert_eq!(contents, vec![("Hello", Sender::Teacher), ("Hi", Sender::Ai)]);
}

#[tokio::test]
async fn test_add_message_posts_sender_tag() {
    let mut server = mockito::Server::new_async().await;
    let insert = server
        .mock("POST", "/rest/v1/messages")
        .match_query(Matcher::Any)
        .match_body(Matcher::Json(json!({
            "thread_id": "t1",
            "content": "Hello",
            "sender": "teacher"
        })))
        .with_status(201)
        .with_body(
            r#"[{"id":"m1","thread_id":"t1","content":"Hello","sender":"teacher","created_at":"2024-03-01T10:01:00+00:00"}]"#,
        )
        .create_async()
        .await;

    let message = db(&server).add_message("t1", "Hello", Sender::Teacher).await.unwrap();

    assert_eq!(message.id, "m1");
    insert.assert_async().await;
}

#[tokio::test]
async fn test_backend_error_is_propagated() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/rest/v1/messages")
        .match_query(Matcher::Any)
        .with_status(409)
        .with_body(r#"{"code":"23503","message":"insert or update violates foreign key constraint","details":null,"hint":null}"#)
        .create_async()
        .await;

    let result = db(&server).add_message("missing", "Hello", Sender::Teacher).await;

    match result {
        Err(PersistError::Backend { status, code, .. }) => {
            assert_eq!(status, 409);
            assert_eq!(code.as_deref(), Some("23503"));
        }
        other => panic!("Expected Backend error, got {:?}", other),
    }
}
