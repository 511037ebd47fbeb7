use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_types::Sender;

/// Append-only entry of a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub content: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub thread_id: String,
    pub content: String,
    pub sender: Sender,
}
