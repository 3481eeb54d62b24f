//! Conversation data model shared by the remote adapters and the session core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Message
// =============================================================================

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a session's message log. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Transcript line for this message: `"{sender}: {text}"`.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.sender, self.text)
    }
}

// =============================================================================
// Summary
// =============================================================================

/// The derived summary currently shown next to a conversation.
///
/// A new payload always replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    #[serde(default)]
    pub last_query: String,
    #[serde(default)]
    pub last_response: String,
    #[serde(with = "timestamp", default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(
        rename = "htmlSummary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rendered_document: Option<String>,
    #[serde(
        rename = "creditRequestId",
        default,
        deserialize_with = "non_empty::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub bound_request_id: Option<String>,
    /// Set once a server-produced document is attached.
    #[serde(rename = "summaryGenerated", default)]
    pub generated: bool,
}

impl SummaryPayload {
    /// Payload for a settled reply whose document has not been rendered yet.
    pub fn pending(query: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            last_query: query.into(),
            last_response: reply.into(),
            timestamp: Utc::now(),
            rendered_document: None,
            bound_request_id: None,
            generated: false,
        }
    }

    /// Payload carrying a rendered document.
    pub fn rendered(
        query: impl Into<String>,
        reply: impl Into<String>,
        document: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            last_query: query.into(),
            last_response: reply.into(),
            timestamp: Utc::now(),
            rendered_document: Some(document.into()),
            bound_request_id: request_id,
            generated: true,
        }
    }

    pub fn has_document(&self) -> bool {
        self.rendered_document.is_some()
    }

    /// Heading for the summary panel.
    pub fn title(&self) -> &'static str {
        if self.bound_request_id.is_some() {
            "Credit Memo Analysis"
        } else {
            "Conversation Summary"
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Prior state of a session as held by the history store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(
        rename = "summaryData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<SummaryPayload>,
    #[serde(
        rename = "selectedRequestId",
        default,
        deserialize_with = "non_empty::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub bound_request_id: Option<String>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.summary.is_none() && self.bound_request_id.is_none()
    }
}

// =============================================================================
// Serde helpers
// =============================================================================

/// Timestamps are written as RFC 3339. On read, naive ISO-8601 values
/// (no offset, as emitted by the history service) are taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
    }
}

/// `null`, a missing field, and `""` all decode to `None`.
mod non_empty {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}
