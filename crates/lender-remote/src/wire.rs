//! Request and response bodies of the reasoning and summary endpoints.

use lender_common::SessionId;
use serde::{Deserialize, Serialize};

/// `POST /chat` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub message: String,
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
}

/// `POST /chat` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_request_id: Option<String>,
    #[serde(default)]
    pub summary_generated: bool,
}

impl ExchangeReply {
    /// Plain reply with nothing embedded.
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            html_summary: None,
            credit_request_id: None,
            summary_generated: false,
        }
    }

    /// Pre-rendered summary document, ignoring blank values.
    pub fn rendered_document(&self) -> Option<&str> {
        self.html_summary.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.credit_request_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// `POST /generate-summary` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SummaryRequest<'a> {
    pub message: &'a str,
}

/// `POST /generate-summary` reply.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SummaryReply {
    pub html_summary: String,
}
