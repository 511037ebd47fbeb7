use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tutor_types::DeferredTask;

use crate::widget::{AuthUser, AuthWidget};

const DEFAULT_RECHECK_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub public_key: String,
    /// Delay before re-reading the session once the login flow returns
    #[serde(default = "default_recheck_delay_ms")]
    pub recheck_delay_ms: u64,
    /// Use the fixed test member instead of the hosted widget
    #[serde(default)]
    pub bypass: bool,
}

fn default_recheck_delay_ms() -> u64 {
    DEFAULT_RECHECK_DELAY_MS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            recheck_delay_ms: DEFAULT_RECHECK_DELAY_MS,
            bypass: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub is_loading: bool,
}

impl AuthState {
    fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    fn settled(user: Option<AuthUser>) -> Self {
        Self {
            user,
            is_loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Tracks the signed-in member on top of an [`AuthWidget`].
///
/// Widget failures never reach the caller: they are logged and the previous
/// state is kept. Observers follow changes through [`AuthSession::subscribe`].
pub struct AuthSession {
    widget: Arc<dyn AuthWidget>,
    public_key: String,
    recheck_delay: Duration,
    state: Arc<watch::Sender<AuthState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    recheck: Mutex<Option<DeferredTask>>,
}

impl AuthSession {
    pub fn new(widget: Arc<dyn AuthWidget>, config: &AuthConfig) -> Self {
        let (state, _) = watch::channel(AuthState::loading());

        Self {
            widget,
            public_key: config.public_key.clone(),
            recheck_delay: Duration::from_millis(config.recheck_delay_ms),
            state: Arc::new(state),
            listener: Mutex::new(None),
            recheck: Mutex::new(None),
        }
    }

    /// Initialize the widget and load the current member
    pub async fn mount(&self) {
        tracing::debug!("Mounting auth session with widget {}", self.widget.name());

        if let Err(e) = self.widget.init(&self.public_key).await {
            tracing::warn!("Auth widget failed to initialize: {}", e);
            self.state.send_replace(AuthState::settled(None));
            return;
        }

        match self.widget.current_member().await {
            Ok(user) => {
                self.state.send_replace(AuthState::settled(user));
            }
            Err(e) => {
                tracing::warn!("Failed to read current member: {}", e);
                self.state.send_replace(AuthState::settled(None));
            }
        }

        if let Some(mut changes) = self.widget.subscribe() {
            let state = self.state.clone();
            let handle = tokio::spawn(async move {
                loop {
                    match changes.recv().await {
                        Ok(user) => {
                            tracing::debug!("Auth session changed, signed in: {}", user.is_some());
                            state.send_replace(AuthState::settled(user));
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Missed {} auth notifications", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            if let Some(previous) = self.listener.lock().await.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Run the interactive sign-in, then re-read the session after a short
    /// delay since the widget may not report the member right away.
    pub async fn login(&self) {
        if let Err(e) = self.widget.open_login().await {
            tracing::warn!("Login flow failed: {}", e);
            return;
        }

        let widget = self.widget.clone();
        let state = self.state.clone();
        let task = DeferredTask::schedule(self.recheck_delay, async move {
            refresh_into(widget.as_ref(), &state).await;
        });

        // replacing drops and cancels any earlier re-check
        *self.recheck.lock().await = Some(task);
    }

    pub async fn logout(&self) {
        if let Err(e) = self.widget.logout().await {
            tracing::warn!("Logout failed: {}", e);
            return;
        }

        if let Some(mut pending) = self.recheck.lock().await.take() {
            pending.cancel();
        }
        self.state.send_replace(AuthState::settled(None));
    }

    /// Re-read the current member right away
    pub async fn refresh(&self) {
        refresh_into(self.widget.as_ref(), &self.state).await;
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get_mut().take() {
            handle.abort();
        }
    }
}

async fn refresh_into(widget: &dyn AuthWidget, state: &watch::Sender<AuthState>) {
    match widget.current_member().await {
        Ok(user) => {
            state.send_replace(AuthState::settled(user));
        }
        Err(e) => tracing::warn!("Failed to re-read auth session: {}", e),
    }
}
