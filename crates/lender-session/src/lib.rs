//! Conversation session orchestration.
//!
//! A [`Session`] owns one conversation: its append-only message log, the
//! current summary payload, and the credit request it is bound to. Sends go
//! through the single-flight exchange controller; summaries are produced by
//! a per-session orchestrator task that never starts a generation while an
//! exchange is outstanding.
//!
//! [`SessionRegistry`] creates sessions, hydrates them from history, and
//! retires the previous one on navigation.

pub mod binding;
pub mod exchange;
pub mod history;
pub mod registry;
pub mod store;
pub mod summary;

#[cfg(test)]
mod fakes;

pub use binding::{bind, bind_section};
pub use exchange::{ExchangeController, ExchangeError, APOLOGY};
pub use history::{FreshReason, HistoryLoader, LoadOutcome};
pub use registry::{Collaborators, Session, SessionRegistry, SessionSettings};
pub use store::{ConversationStore, ExchangeGuard, GenerationGuard};
pub use summary::{RefreshError, SummaryHandle, SummarySettings, SummaryState};
