//! Session entry: one attempt to restore prior state.
//!
//! Every failure starts the session fresh. The reason is kept so callers
//! can tell a brand-new session from an unreachable store.

use std::sync::Arc;
use tracing::{debug, info, warn};

use lender_common::{SessionId, SessionSnapshot};
use lender_remote::{HistoryStore, ServiceError};

use crate::store::ConversationStore;

/// Why a session started with an empty log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshReason {
    /// The store has never seen this id. Expected for new sessions.
    NotFound,
    /// Network fault or non-success status.
    Transport,
    /// The store answered with something that does not decode.
    Malformed,
}

impl From<&ServiceError> for FreshReason {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::NotFound => FreshReason::NotFound,
            ServiceError::Transport(_) | ServiceError::Status { .. } => FreshReason::Transport,
            ServiceError::Malformed(_) => FreshReason::Malformed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Restored(SessionSnapshot),
    Fresh(FreshReason),
}

impl LoadOutcome {
    pub fn fresh_reason(&self) -> Option<FreshReason> {
        match self {
            LoadOutcome::Restored(_) => None,
            LoadOutcome::Fresh(reason) => Some(*reason),
        }
    }
}

pub struct HistoryLoader {
    store: Arc<dyn HistoryStore>,
}

impl HistoryLoader {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Fetch prior state for `session`. Never retries.
    pub async fn load(&self, session: &SessionId) -> LoadOutcome {
        match self.store.fetch(session).await {
            Ok(snapshot) => {
                info!(
                    session = %session,
                    messages = snapshot.messages.len(),
                    "restored session history"
                );
                LoadOutcome::Restored(snapshot)
            }
            Err(ServiceError::NotFound) => {
                debug!(session = %session, "no history, starting fresh");
                LoadOutcome::Fresh(FreshReason::NotFound)
            }
            Err(e) => {
                warn!(session = %session, error = %e, "history load failed, starting fresh");
                LoadOutcome::Fresh(FreshReason::from(&e))
            }
        }
    }

    /// Load and hydrate `target`. Returns the fresh reason, or `None` when
    /// prior state was restored.
    pub async fn prime(&self, target: &ConversationStore) -> Option<FreshReason> {
        match self.load(target.session()).await {
            LoadOutcome::Restored(snapshot) => {
                target.hydrate(snapshot);
                None
            }
            LoadOutcome::Fresh(reason) => {
                target.hydrate(SessionSnapshot::default());
                Some(reason)
            }
        }
    }
}
