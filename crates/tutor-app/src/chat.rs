use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tutor_auth::AuthSession;
use tutor_llm::{AssistantClient, ChatRequest, ChunkCallback};
use tutor_persist::{DatabaseService, Message, PersistenceClient, Sender, Thread};
use tutor_types::{ChatEvent, DeferredTask, Notice, StudentContext};

use crate::config::ChatConfig;
use crate::error::{AppError, Result};
use crate::form::NewStudentForm;
use crate::state::{AppState, ThreadPreview};

/// Stored as the assistant's turn when no usable reply came back
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't generate a response right now. Please try again in a moment.";

const DEFAULT_TYPING_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Typing indicator clears by itself after this long
    pub typing_timeout: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            typing_timeout: Duration::from_millis(DEFAULT_TYPING_TIMEOUT_MS),
        }
    }
}

impl From<&ChatConfig> for ChatSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            typing_timeout: Duration::from_millis(config.typing_timeout_ms),
        }
    }
}

/// Drives the chat: threads, messages and the assistant round trip.
///
/// Every user-facing change is also pushed as a [`ChatEvent`] on the channel
/// returned by [`ChatController::new`].
pub struct ChatController {
    persistence: Arc<dyn PersistenceClient>,
    assistant: Arc<dyn AssistantClient>,
    auth: Arc<AuthSession>,
    settings: ChatSettings,
    events: mpsc::UnboundedSender<ChatEvent>,
    state: Arc<Mutex<AppState>>,
    db: RwLock<Option<DatabaseService>>,
    typing_reset: Mutex<Option<DeferredTask>>,
}

impl ChatController {
    pub fn new(
        persistence: Arc<dyn PersistenceClient>,
        assistant: Arc<dyn AssistantClient>,
        auth: Arc<AuthSession>,
        settings: ChatSettings,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (events, rx) = mpsc::unbounded_channel();

        let controller = Self {
            persistence,
            assistant,
            auth,
            settings,
            events,
            state: Arc::new(Mutex::new(AppState::default())),
            db: RwLock::new(None),
            typing_reset: Mutex::new(None),
        };

        (controller, rx)
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    pub async fn previews(&self) -> Vec<ThreadPreview> {
        self.state.lock().await.previews()
    }

    /// Register the signed-in member as a teacher and load their threads
    pub async fn bootstrap(&self) -> Result<()> {
        let user = self.auth.current_user().ok_or(AppError::NotAuthenticated)?;

        let db = DatabaseService::new(self.persistence.clone(), user.id.clone());
        let teacher = db
            .ensure_teacher(&user.email, user.display_name().as_deref())
            .await
            .map_err(|e| self.report("Failed to load your account", e))?;
        tracing::info!(teacher_id = %teacher.id, "Teacher session ready");

        *self.db.write().await = Some(db);
        self.reload_threads().await?;
        Ok(())
    }

    pub async fn reload_threads(&self) -> Result<usize> {
        let db = self.db().await?;
        let threads = db
            .get_threads_with_students_and_messages()
            .await
            .map_err(|e| self.report("Failed to load threads", e))?;
        let count = threads.len();

        let active = {
            let mut state = self.state.lock().await;
            state.set_threads(threads);
            state.active_thread_id.clone()
        };

        self.emit(ChatEvent::ThreadsLoaded { count });
        if let Some(thread_id) = active {
            self.emit(ChatEvent::ThreadSelected { thread_id });
        }
        Ok(count)
    }

    /// Create a student from the form and open an empty thread about them
    pub async fn create_thread(&self, form: &NewStudentForm) -> Result<Thread> {
        let student = form.validate()?;
        let db = self.db().await?;

        let created = db
            .create_student(&student.name, &student.grade, student.interests)
            .await
            .map_err(|e| self.report("Failed to create student", e))?;
        let thread = db
            .create_thread(&created.id)
            .await
            .map_err(|e| self.report("Failed to create thread", e))?;

        {
            let mut state = self.state.lock().await;
            state.prepend_thread(thread.clone());
            state.create_modal_open = false;
        }

        self.emit(ChatEvent::ThreadSelected {
            thread_id: thread.id.clone(),
        });
        self.emit(ChatEvent::Notice(Notice::success(
            "Thread created",
            format!("Started a conversation about {}", created.name),
        )));
        Ok(thread)
    }

    /// Send a teacher message on the active thread and store the assistant's
    /// answer. Blank input is ignored and yields `None`.
    pub async fn send_message(&self, content: &str) -> Result<Option<Message>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let db = self.db().await?;
        let (thread_id, context) = {
            let state = self.state.lock().await;
            let thread = state.active_thread().ok_or(AppError::NoActiveThread)?;
            (thread.id.clone(), thread.student.context())
        };

        let sent = db
            .add_message(&thread_id, content, Sender::Teacher)
            .await
            .map_err(|e| self.report("Failed to send message", e))?;
        self.append(sent).await;
        self.start_typing(&thread_id).await;

        let reply = self.ask_assistant(&thread_id, content, context).await;

        let saved = db.add_message(&thread_id, &reply, Sender::Ai).await;
        self.stop_typing(&thread_id).await;
        let message = saved.map_err(|e| self.report("Failed to save AI response", e))?;

        self.append(message.clone()).await;
        Ok(Some(message))
    }

    pub async fn select_thread(&self, thread_id: &str) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.thread(thread_id).is_none() {
                return Err(AppError::ThreadNotFound(thread_id.to_string()));
            }
            state.active_thread_id = Some(thread_id.to_string());
        }

        self.emit(ChatEvent::ThreadSelected {
            thread_id: thread_id.to_string(),
        });
        Ok(())
    }

    /// Returns the new sidebar visibility
    pub async fn toggle_sidebar(&self) -> bool {
        let mut state = self.state.lock().await;
        state.sidebar_open = !state.sidebar_open;
        state.sidebar_open
    }

    pub async fn open_create_modal(&self) {
        self.state.lock().await.create_modal_open = true;
    }

    pub async fn close_create_modal(&self) {
        self.state.lock().await.create_modal_open = false;
    }

    /// Log out and forget everything loaded for the member
    pub async fn sign_out(&self) {
        self.auth.logout().await;
        if self.auth.is_authenticated() {
            return;
        }

        if let Some(mut pending) = self.typing_reset.lock().await.take() {
            pending.cancel();
        }
        *self.db.write().await = None;
        *self.state.lock().await = AppState::default();
    }

    async fn ask_assistant(&self, thread_id: &str, content: &str, context: StudentContext) -> String {
        let events = self.events.clone();
        let delta_thread = thread_id.to_string();
        let mut forward = move |delta: &str| {
            let _ = events.send(ChatEvent::Delta {
                thread_id: delta_thread.clone(),
                content: delta.to_string(),
            });
        };
        let on_chunk: ChunkCallback<'_> = &mut forward;

        let request = ChatRequest::new(content, context);
        match self.assistant.generate_response(request, Some(on_chunk)).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!(%thread_id, "Assistant returned an empty reply");
                self.emit(ChatEvent::Notice(Notice::error(
                    "AI response unavailable",
                    "The assistant returned an empty reply",
                )));
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                tracing::error!(%thread_id, "AI request failed: {}", e);
                self.emit(ChatEvent::Notice(Notice::error("AI response unavailable", e.to_string())));
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn append(&self, message: Message) {
        let event = ChatEvent::MessageAdded {
            thread_id: message.thread_id.clone(),
            message_id: message.id.clone(),
            sender: message.sender,
            content: message.content.clone(),
        };

        if !self.state.lock().await.push_message(message) {
            tracing::warn!("Message for a thread that is not loaded");
        }
        self.emit(event);
    }

    async fn start_typing(&self, thread_id: &str) {
        self.state.lock().await.typing = true;
        self.emit(ChatEvent::Typing {
            thread_id: thread_id.to_string(),
            active: true,
        });

        let state = self.state.clone();
        let events = self.events.clone();
        let thread_id = thread_id.to_string();
        let reset = DeferredTask::schedule(self.settings.typing_timeout, async move {
            state.lock().await.typing = false;
            let _ = events.send(ChatEvent::Typing {
                thread_id,
                active: false,
            });
        });

        // replacing cancels an earlier reset
        *self.typing_reset.lock().await = Some(reset);
    }

    async fn stop_typing(&self, thread_id: &str) {
        if let Some(mut pending) = self.typing_reset.lock().await.take() {
            pending.cancel();
        }

        let was_typing = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut state.typing, false)
        };
        if was_typing {
            self.emit(ChatEvent::Typing {
                thread_id: thread_id.to_string(),
                active: false,
            });
        }
    }

    async fn db(&self) -> Result<DatabaseService> {
        self.db.read().await.clone().ok_or(AppError::NotAuthenticated)
    }

    /// Log a failed operation and surface it as an error notice
    fn report(&self, title: &str, err: impl Into<AppError>) -> AppError {
        let err = err.into();
        tracing::error!("{}: {}", title, err);
        self.emit(ChatEvent::Notice(Notice::error(title, err.to_string())));
        err
    }

    fn emit(&self, event: ChatEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Chat event dropped, no listener");
        }
    }
}
