//! In-memory state of one conversation.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use lender_common::{Message, Sender, SessionId, SessionSnapshot, SummaryPayload};

/// Message log, current summary and bound request of a single session.
///
/// The log only ever grows. Readers receive cloned snapshots, so a
/// sequence read at length N is always a prefix of any later read.
pub struct ConversationStore {
    session: SessionId,
    messages: RwLock<Vec<Message>>,
    summary: RwLock<Option<SummaryPayload>>,
    bound_request: RwLock<Option<String>>,
    hydrated: AtomicBool,
    exchange_in_flight: AtomicBool,
    generating: AtomicBool,
    active: AtomicBool,
}

impl ConversationStore {
    pub fn new(session: SessionId) -> Arc<Self> {
        Arc::new(Self {
            session,
            messages: RwLock::new(Vec::new()),
            summary: RwLock::new(None),
            bound_request: RwLock::new(None),
            hydrated: AtomicBool::new(false),
            exchange_in_flight: AtomicBool::new(false),
            generating: AtomicBool::new(false),
            active: AtomicBool::new(true),
        })
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    // -------------------------------------------------------------------------
    // Log
    // -------------------------------------------------------------------------

    /// Append a message stamped with the current time.
    pub fn append(&self, sender: Sender, text: impl Into<String>) -> Message {
        let mut log = self
            .messages
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        let message = Message {
            id: format!("msg_{}_{}", now.timestamp_millis(), log.len() + 1),
            text: text.into(),
            sender,
            timestamp: now,
        };
        log.push(message.clone());
        message
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole log as `"{sender}: {text}"` lines.
    pub fn transcript(&self) -> String {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the latest user message and of the latest agent message.
    pub fn last_exchange(&self) -> (String, String) {
        let log = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        let last_of = |sender: Sender| {
            log.iter()
                .rev()
                .find(|m| m.sender == sender)
                .map(|m| m.text.clone())
                .unwrap_or_default()
        };
        (last_of(Sender::User), last_of(Sender::Agent))
    }

    /// Replace log, summary and bound request with prior state.
    ///
    /// Only the first call has any effect.
    pub fn hydrate(&self, snapshot: SessionSnapshot) -> bool {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            warn!(session = %self.session, "ignoring repeated hydration");
            return false;
        }
        debug!(
            session = %self.session,
            messages = snapshot.messages.len(),
            summary = snapshot.summary.is_some(),
            "hydrating session"
        );
        *self.messages.write().unwrap_or_else(PoisonError::into_inner) = snapshot.messages;
        *self.summary.write().unwrap_or_else(PoisonError::into_inner) = snapshot.summary;
        *self
            .bound_request
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot.bound_request_id;
        true
    }

    // -------------------------------------------------------------------------
    // Summary and binding
    // -------------------------------------------------------------------------

    pub fn summary(&self) -> Option<SummaryPayload> {
        self.summary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current payload wholesale.
    pub fn install_summary(&self, payload: SummaryPayload) {
        *self.summary.write().unwrap_or_else(PoisonError::into_inner) = Some(payload);
    }

    /// True unless the current payload already carries a generated document.
    pub fn needs_generation(&self) -> bool {
        !self
            .summary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| s.generated && s.has_document())
    }

    pub fn bound_request(&self) -> Option<String> {
        self.bound_request
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn bind_request(&self, request_id: impl Into<String>) {
        *self
            .bound_request
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(request_id.into());
    }

    // -------------------------------------------------------------------------
    // Activity
    // -------------------------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark the session as no longer current. Results of calls still in
    /// flight are discarded when they arrive.
    pub fn deactivate(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!(session = %self.session, "session deactivated");
        }
    }

    pub fn exchange_in_flight(&self) -> bool {
        self.exchange_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Claim the single exchange slot. `None` if one is already outstanding.
    pub fn try_begin_exchange(self: &Arc<Self>) -> Option<ExchangeGuard> {
        self.exchange_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ExchangeGuard {
                store: Arc::clone(self),
            })
    }

    /// Claim the generation slot. `None` while an exchange is in flight or
    /// another generation is running.
    pub fn try_begin_generation(self: &Arc<Self>) -> Option<GenerationGuard> {
        if self
            .generating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        if self.exchange_in_flight.load(Ordering::SeqCst) {
            self.generating.store(false, Ordering::SeqCst);
            return None;
        }
        Some(GenerationGuard {
            store: Arc::clone(self),
        })
    }
}

/// Holds the exchange slot; releases it on drop.
pub struct ExchangeGuard {
    store: Arc<ConversationStore>,
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        self.store.exchange_in_flight.store(false, Ordering::SeqCst);
    }
}

/// Holds the generation slot; releases it on drop.
pub struct GenerationGuard {
    store: Arc<ConversationStore>,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.store.generating.store(false, Ordering::SeqCst);
    }
}
