//! Single-flight message exchange with the reasoning service.

use std::sync::Arc;
use tracing::{debug, info, warn};

use lender_common::{EventBus, ReplySettled, Sender, SessionEvent};
use lender_remote::{ExchangeRequest, ReasoningService, ServiceError};

use crate::store::ConversationStore;

/// Agent message appended when the reasoning service cannot be reached.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("an exchange is already in flight for this session")]
    Busy,

    #[error("session is no longer active")]
    Inactive,

    /// The failure path ran: the apology is already in the log.
    #[error("reasoning service failed: {0}")]
    Remote(#[from] ServiceError),
}

pub struct ExchangeController {
    store: Arc<ConversationStore>,
    bus: EventBus,
    reasoning: Arc<dyn ReasoningService>,
}

impl ExchangeController {
    pub fn new(
        store: Arc<ConversationStore>,
        bus: EventBus,
        reasoning: Arc<dyn ReasoningService>,
    ) -> Self {
        Self {
            store,
            bus,
            reasoning,
        }
    }

    /// Send `text` and wait for the reply.
    ///
    /// The user message is in the log before the remote call is issued.
    /// On failure the apology is appended instead of a reply, so the log
    /// always ends with an agent message once this returns.
    pub async fn send(&self, text: &str) -> Result<String, ExchangeError> {
        if text.trim().is_empty() {
            return Err(ExchangeError::EmptyMessage);
        }
        if !self.store.is_active() {
            return Err(ExchangeError::Inactive);
        }
        let guard = self.store.try_begin_exchange().ok_or(ExchangeError::Busy)?;

        let session = self.store.session().clone();
        let user = self.store.append(Sender::User, text);
        self.bus.publish(SessionEvent::MessageAppended(user));
        self.bus.publish(SessionEvent::ExchangeStarted);
        debug!(session = %session, "exchange started");

        let request = ExchangeRequest {
            message: text.to_string(),
            session_id: session.clone(),
        };
        let outcome = self.reasoning.exchange(&request).await;

        if !self.store.is_active() {
            warn!(session = %session, "discarding reply for inactive session");
            return Err(ExchangeError::Inactive);
        }

        match outcome {
            Ok(reply) => {
                let agent = self.store.append(Sender::Agent, reply.response.as_str());
                self.bus.publish(SessionEvent::MessageAppended(agent));

                let request_id = reply.request_id().map(str::to_string);
                if let Some(id) = &request_id {
                    self.store.bind_request(id.clone());
                    self.bus.publish(SessionEvent::RequestBound(id.clone()));
                }
                drop(guard);

                info!(session = %session, embedded = reply.rendered_document().is_some(), "reply settled");
                self.bus.publish(SessionEvent::ReplySettled(ReplySettled {
                    query: text.to_string(),
                    reply: reply.response.clone(),
                    rendered_document: reply.rendered_document().map(str::to_string),
                    request_id,
                }));
                Ok(reply.response)
            }
            Err(e) => {
                warn!(session = %session, error = %e, "exchange failed");
                let apology = self.store.append(Sender::Agent, APOLOGY);
                self.bus.publish(SessionEvent::MessageAppended(apology));
                drop(guard);

                self.bus.publish(SessionEvent::ExchangeFailed {
                    error: e.to_string(),
                });
                Err(ExchangeError::Remote(e))
            }
        }
    }
}
