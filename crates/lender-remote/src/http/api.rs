//! Collaborator trait implementations for `HttpBackend`.

use async_trait::async_trait;
use tracing::debug;

use lender_common::{SessionId, SessionSnapshot};

use crate::catalog::{CreditRequest, CreditRequestDetails};
use crate::wire::{ExchangeReply, ExchangeRequest, SummaryReply, SummaryRequest};
use crate::{CreditCatalog, HistoryStore, ReasoningService, ServiceError, SummaryService};

use super::client::HttpBackend;

#[async_trait]
impl ReasoningService for HttpBackend {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<ExchangeReply, ServiceError> {
        debug!(session = %request.session_id, len = request.message.len(), "reasoning request");
        self.post_json(&["chat"], request).await
    }
}

#[async_trait]
impl SummaryService for HttpBackend {
    async fn summarize(&self, transcript: &str) -> Result<String, ServiceError> {
        debug!(len = transcript.len(), "summary request");
        let reply: SummaryReply = self
            .post_json(&["generate-summary"], &SummaryRequest {
                message: transcript,
            })
            .await?;
        Ok(reply.html_summary)
    }
}

#[async_trait]
impl HistoryStore for HttpBackend {
    async fn fetch(&self, session: &SessionId) -> Result<SessionSnapshot, ServiceError> {
        self.get_json(&["chat-history", session.as_str()]).await
    }
}

#[async_trait]
impl CreditCatalog for HttpBackend {
    async fn list(&self) -> Result<Vec<CreditRequest>, ServiceError> {
        self.get_json(&["credit-requests"]).await
    }

    async fn details(&self, request_id: &str) -> Result<CreditRequestDetails, ServiceError> {
        self.get_json(&["credit-requests", request_id]).await
    }
}
