use chrono::{DateTime, Utc};
use tutor_persist::{Message, Thread};

/// Interest tags shown per thread in the sidebar
const PREVIEW_INTERESTS: usize = 2;

/// Everything the front-end renders
#[derive(Debug, Clone)]
pub struct AppState {
    /// Newest thread first
    pub threads: Vec<Thread>,
    pub active_thread_id: Option<String>,
    pub sidebar_open: bool,
    pub create_modal_open: bool,
    pub typing: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            threads: Vec::new(),
            active_thread_id: None,
            sidebar_open: true,
            create_modal_open: false,
            typing: false,
        }
    }
}

/// Sidebar entry for one thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPreview {
    pub thread_id: String,
    pub student_name: String,
    pub grade: String,
    pub interests: Vec<String>,
    /// Interests not listed in `interests`
    pub hidden_interests: usize,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl AppState {
    pub fn active_thread(&self) -> Option<&Thread> {
        let id = self.active_thread_id.as_deref()?;
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn thread(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == thread_id)
    }

    /// Replace the thread list, keeping the selection when it still exists
    /// and otherwise falling back to the newest thread
    pub fn set_threads(&mut self, threads: Vec<Thread>) {
        self.threads = threads;

        let still_there = self
            .active_thread_id
            .as_deref()
            .is_some_and(|id| self.threads.iter().any(|t| t.id == id));
        if !still_there {
            self.active_thread_id = self.threads.first().map(|t| t.id.clone());
        }
    }

    /// Put a freshly created thread on top and select it
    pub fn prepend_thread(&mut self, thread: Thread) {
        self.active_thread_id = Some(thread.id.clone());
        self.threads.insert(0, thread);
    }

    /// Append to the owning thread. False if that thread is not loaded.
    pub fn push_message(&mut self, message: Message) -> bool {
        match self.threads.iter_mut().find(|t| t.id == message.thread_id) {
            Some(thread) => {
                thread.messages.push(message);
                true
            }
            None => false,
        }
    }

    pub fn previews(&self) -> Vec<ThreadPreview> {
        self.threads
            .iter()
            .map(|thread| {
                let last = thread.last_message();
                let interests = &thread.student.interests;

                ThreadPreview {
                    thread_id: thread.id.clone(),
                    student_name: thread.student.name.clone(),
                    grade: thread.student.grade.clone(),
                    interests: interests.iter().take(PREVIEW_INTERESTS).cloned().collect(),
                    hidden_interests: interests.len().saturating_sub(PREVIEW_INTERESTS),
                    last_message: last.map(|m| m.content.clone()),
                    last_message_at: last.map(|m| m.created_at),
                    active: self.active_thread_id.as_deref() == Some(thread.id.as_str()),
                }
            })
            .collect()
    }
}

/// Coarse age label: "Just now", "5m ago", "3h ago", "2d ago"
pub fn format_relative(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - time).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", days)
    }
}
