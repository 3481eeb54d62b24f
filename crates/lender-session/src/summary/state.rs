use std::fmt;

use lender_remote::ServiceError;

/// Where the summary orchestrator of a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryState {
    #[default]
    Idle,
    /// A settle delay is running; a new exchange cancels it.
    PendingDebounce,
    /// A summary call is outstanding.
    Generating,
}

impl fmt::Display for SummaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryState::Idle => f.write_str("idle"),
            SummaryState::PendingDebounce => f.write_str("pending"),
            SummaryState::Generating => f.write_str("generating"),
        }
    }
}

/// Why a manual refresh produced no new summary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("nothing to summarize yet")]
    EmptyConversation,

    #[error("an exchange is in flight")]
    ExchangeInFlight,

    #[error("summary is {0}")]
    NotIdle(SummaryState),

    #[error("session is closed")]
    Closed,

    #[error("summary service failed: {0}")]
    Remote(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(SummaryState::default().to_string(), "idle");
        assert_eq!(
            RefreshError::NotIdle(SummaryState::PendingDebounce).to_string(),
            "summary is pending"
        );
    }
}
