//! Remote collaborators of the lending assistant.
//!
//! Each external service the conversation core depends on is a small
//! async trait:
//! - [`ReasoningService`]: turns a user utterance into a reply
//! - [`SummaryService`]: renders a transcript into a summary document
//! - [`HistoryStore`]: prior state of a session, keyed by session id
//! - [`CreditCatalog`]: read-only list of credit requests
//!
//! [`HttpBackend`] implements all four against a single base URL.

pub mod catalog;
pub mod http;
pub mod wire;

use async_trait::async_trait;
use lender_common::{SessionId, SessionSnapshot};

pub use catalog::{CreditRequest, CreditRequestDetails, CreditStatus};
pub use http::{BackendConfig, HttpBackend};
pub use wire::{ExchangeReply, ExchangeRequest};

#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<ExchangeReply, ServiceError>;
}

#[async_trait]
pub trait SummaryService: Send + Sync {
    /// Render a `"{sender}: {text}"` transcript into a summary document.
    async fn summarize(&self, transcript: &str) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fetch prior state. A session the store has never seen yields
    /// [`ServiceError::NotFound`].
    async fn fetch(&self, session: &SessionId) -> Result<SessionSnapshot, ServiceError>;
}

#[async_trait]
pub trait CreditCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<CreditRequest>, ServiceError>;

    async fn details(&self, request_id: &str) -> Result<CreditRequestDetails, ServiceError>;
}

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,
    #[error("network error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound)
    }

    /// Network faults and non-success statuses both count as transport
    /// failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, ServiceError::Transport(_) | ServiceError::Status { .. })
    }
}
