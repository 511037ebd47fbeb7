use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Message, Student};

/// Conversation between one teacher and the assistant about one student,
/// as returned by the joined read (student and messages embedded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub teacher_id: String,
    pub student_id: String,
    pub created_at: DateTime<Utc>,
    pub student: Student,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Thread {
    /// Order messages by creation time. Stable, so equal timestamps keep
    /// the order the backend returned them in.
    pub fn sort_messages(&mut self) {
        self.messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewThread {
    pub teacher_id: String,
    pub student_id: String,
}
