use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::PostgrestErrorBody;
use crate::error::{PersistError, Result};
use crate::models::{Message, NewMessage, NewStudent, NewTeacher, NewThread, Student, Teacher, Thread};
use crate::trait_client::PersistenceClient;

const THREAD_SELECT: &str = "*,student:students(*),messages(*)";

/// Hosted relational store reached through its PostgREST interface
pub struct PostgrestClient {
    http_client: reqwest::Client,
    rest_url: String,
}

impl PostgrestClient {
    /// Create a client for `{base_url}/rest/v1` authenticated with the project key
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("apikey"),
            HeaderValue::from_str(api_key)
                .map_err(|_| PersistError::Configuration("Invalid API key format".to_string()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| PersistError::Configuration("Invalid API key format".to_string()))?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    async fn select<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<R>> {
        tracing::debug!(table, ?query, "PostgREST select");

        let response = self
            .http_client
            .get(self.table_url(table))
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Insert one row and return its representation
    async fn insert_one<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
        select: &str,
    ) -> Result<R> {
        tracing::debug!(table, "PostgREST insert");

        let response = self
            .http_client
            .post(self.table_url(table))
            .query(&[("select", select)])
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let rows: Vec<R> = Self::handle_response(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PersistError::NotFound(format!("insert into {} returned no row", table)))
    }

    async fn handle_response<R: DeserializeOwned>(response: Response) -> Result<R> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error_body: PostgrestErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let error = error_body.into_error(status.as_u16(), &body);
            tracing::error!(%status, error = %error, "PostgREST request failed");
            return Err(error);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PersistenceClient for PostgrestClient {
    async fn find_teacher(&self, external_id: &str) -> Result<Option<Teacher>> {
        let rows: Vec<Teacher> = self
            .select(
                "teachers",
                &[
                    ("memberstack_id", format!("eq.{}", external_id)),
                    ("select", "*".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher> {
        self.insert_one("teachers", &teacher, "*").await
    }

    async fn insert_student(&self, student: NewStudent) -> Result<Student> {
        self.insert_one("students", &student, "*").await
    }

    async fn insert_thread(&self, thread: NewThread) -> Result<Thread> {
        self.insert_one("threads", &thread, THREAD_SELECT).await
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        self.insert_one("messages", &message, "*").await
    }

    async fn list_threads(&self, teacher_id: &str) -> Result<Vec<Thread>> {
        self.select(
            "threads",
            &[
                ("teacher_id", format!("eq.{}", teacher_id)),
                ("select", THREAD_SELECT.to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    fn name(&self) -> &str {
        "postgrest"
    }
}
