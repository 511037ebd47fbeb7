use serde::{Deserialize, Serialize};

use crate::context::Sender;

/// Events emitted by the application core towards whatever front-end drives it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Thread list was (re)loaded from the store
    ThreadsLoaded {
        count: usize,
    },

    /// A thread became the active one
    ThreadSelected {
        thread_id: String,
    },

    /// A message was persisted and appended to its thread
    MessageAdded {
        thread_id: String,
        message_id: String,
        sender: Sender,
        content: String,
    },

    /// Partial assistant text, in arrival order
    Delta {
        thread_id: String,
        content: String,
    },

    /// Typing indicator changed
    Typing {
        thread_id: String,
        active: bool,
    },

    /// User-visible transient notification
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}
