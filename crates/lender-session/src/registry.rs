//! Session lifecycle: entry, hydration, and retirement on navigation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lender_common::{EventBus, Message, SessionEvent, SessionId, SummaryPayload};
use lender_remote::{HistoryStore, HttpBackend, ReasoningService, SummaryService};

use crate::binding;
use crate::exchange::{ExchangeController, ExchangeError};
use crate::history::{FreshReason, HistoryLoader};
use crate::store::ConversationStore;
use crate::summary::{self, RefreshError, SummaryHandle, SummarySettings, SummaryState};

/// Remote services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub reasoning: Arc<dyn ReasoningService>,
    pub summary: Arc<dyn SummaryService>,
    pub history: Arc<dyn HistoryStore>,
}

impl Collaborators {
    /// Use one HTTP backend for every service.
    pub fn from_backend(backend: Arc<HttpBackend>) -> Self {
        Self {
            reasoning: backend.clone(),
            summary: backend.clone(),
            history: backend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub summary: SummarySettings,
    /// Broadcast buffer per session.
    pub event_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            summary: SummarySettings::default(),
            event_capacity: 64,
        }
    }
}

impl SessionSettings {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.summary.settle_delay = delay;
        self
    }

    pub fn with_auto_generate(mut self, enabled: bool) -> Self {
        self.summary.auto_generate = enabled;
        self
    }
}

// =============================================================================
// Session
// =============================================================================

/// Handle to one hydrated conversation.
pub struct Session {
    store: Arc<ConversationStore>,
    bus: EventBus,
    exchange: ExchangeController,
    summary: SummaryHandle,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    fresh_reason: Option<FreshReason>,
}

impl Session {
    pub fn id(&self) -> &SessionId {
        self.store.session()
    }

    pub async fn send(&self, text: &str) -> Result<String, ExchangeError> {
        self.exchange.send(text).await
    }

    pub async fn refresh(&self) -> Result<SummaryPayload, RefreshError> {
        self.summary.refresh().await
    }

    /// Bind the session to a credit request and return the draft prompt
    /// for it. Nothing is sent.
    pub fn select_request(&self, request_id: &str) -> String {
        let request_id = request_id.trim();
        self.store.bind_request(request_id);
        self.bus
            .publish(SessionEvent::RequestBound(request_id.to_string()));
        binding::bind(request_id)
    }

    pub fn section_draft(&self, section_name: &str) -> String {
        binding::bind_section(section_name.trim())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.store.messages()
    }

    pub fn summary(&self) -> Option<SummaryPayload> {
        self.store.summary()
    }

    pub fn bound_request(&self) -> Option<String> {
        self.store.bound_request()
    }

    pub fn summary_state(&self) -> SummaryState {
        self.summary.state()
    }

    /// Why the session started empty, or `None` if history was restored.
    pub fn fresh_reason(&self) -> Option<FreshReason> {
        self.fresh_reason
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn is_active(&self) -> bool {
        self.store.is_active()
    }

    /// Retire the session. Calls still in flight complete, but their
    /// results are discarded.
    pub fn close(&self) {
        self.store.deactivate();
        self.cancel.cancel();
    }

    /// Close and wait for the orchestrator task to stop.
    pub async fn shutdown(&self) {
        self.close();
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(session = %self.id(), error = %e, "summary task ended abnormally");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Owns the currently active session.
pub struct SessionRegistry {
    collaborators: Collaborators,
    settings: SessionSettings,
    active: Mutex<Option<Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(collaborators: Collaborators, settings: SessionSettings) -> Self {
        Self {
            collaborators,
            settings,
            active: Mutex::new(None),
        }
    }

    /// Enter `id`: retire the current session, hydrate a new one from
    /// history (one attempt), and start its summary orchestrator.
    ///
    /// The handle is only returned after hydration, so nothing can be sent
    /// before prior state is in place.
    pub async fn enter(&self, id: SessionId) -> Arc<Session> {
        if let Some(previous) = self.take_active() {
            info!(from = %previous.id(), to = %id, "leaving session");
            previous.close();
        }

        let store = ConversationStore::new(id.clone());
        let bus = EventBus::new(self.settings.event_capacity);

        let loader = HistoryLoader::new(self.collaborators.history.clone());
        let fresh_reason = loader.prime(&store).await;

        let cancel = CancellationToken::new();
        let events = bus.subscribe();
        bus.publish(SessionEvent::Hydrated {
            messages: store.len(),
        });
        let (summary, task) = summary::spawn(
            store.clone(),
            self.collaborators.summary.clone(),
            bus.clone(),
            events,
            self.settings.summary.clone(),
            cancel.clone(),
        );
        let exchange = ExchangeController::new(
            store.clone(),
            bus.clone(),
            self.collaborators.reasoning.clone(),
        );

        let session = Arc::new(Session {
            store,
            bus,
            exchange,
            summary,
            cancel,
            task: Mutex::new(Some(task)),
            fresh_reason,
        });
        info!(session = %id, messages = session.store.len(), "entered session");

        let replaced = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(session.clone());
        if let Some(replaced) = replaced {
            replaced.close();
        }
        session
    }

    /// Enter a brand-new session with a generated id.
    pub async fn start_new(&self) -> Arc<Session> {
        self.enter(SessionId::generate()).await
    }

    pub fn active(&self) -> Option<Arc<Session>> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn take_active(&self) -> Option<Arc<Session>> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
