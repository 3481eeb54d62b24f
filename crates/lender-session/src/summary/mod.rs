//! Per-session summary orchestration.
//!
//! `Idle -> PendingDebounce -> Generating -> Idle`. A settled reply arms a
//! settle delay; a new exchange cancels it; the delay firing (or a manual
//! refresh from `Idle`) runs one summary call over the whole transcript.
//! Generation never starts while an exchange is in flight.

mod orchestrator;
mod state;

pub use orchestrator::{spawn, SummaryHandle, SummarySettings};
pub use state::{RefreshError, SummaryState};
