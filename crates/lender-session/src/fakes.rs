//! Scripted collaborators that record every call.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use lender_common::{SessionId, SessionSnapshot};
use lender_remote::{
    ExchangeReply, ExchangeRequest, HistoryStore, ReasoningService, ServiceError, SummaryService,
};

use crate::store::ConversationStore;

/// Messages containing this marker get a transport failure.
pub const FAIL_MARKER: &str = "[fail]";

// =============================================================================
// Reasoning
// =============================================================================

pub struct FakeReasoning {
    scripted: Mutex<VecDeque<Result<ExchangeReply, ServiceError>>>,
    fallback: Result<ExchangeReply, ServiceError>,
    latency: Duration,
    requests: Mutex<Vec<ExchangeRequest>>,
}

impl FakeReasoning {
    fn new(fallback: Result<ExchangeReply, ServiceError>) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback,
            latency: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Ok(ExchangeReply::text(text)))
    }

    pub fn with_reply(reply: ExchangeReply) -> Self {
        Self::new(Ok(reply))
    }

    pub fn failing(error: ServiceError) -> Self {
        Self::new(Err(error))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a one-off result ahead of the fallback.
    pub fn then(self, result: Result<ExchangeReply, ServiceError>) -> Self {
        self.scripted.lock().unwrap().push_back(result);
        self
    }

    pub fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningService for FakeReasoning {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<ExchangeReply, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        let result = self
            .scripted
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if request.message.contains(FAIL_MARKER) {
            return Err(ServiceError::Transport("scripted failure".into()));
        }
        result
    }
}

// =============================================================================
// Summary
// =============================================================================

pub struct FakeSummary {
    scripted: Mutex<VecDeque<Result<String, ServiceError>>>,
    latency: Duration,
    gate: Option<Semaphore>,
    transcripts: Mutex<Vec<String>>,
    probe: Mutex<Option<Arc<ConversationStore>>>,
    overlaps: AtomicUsize,
}

impl FakeSummary {
    /// Answers call `n` (1-based) with `<div>summary n</div>`.
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            latency: Duration::ZERO,
            gate: None,
            transcripts: Mutex::new(Vec::new()),
            probe: Mutex::new(None),
            overlaps: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Hold every call until [`FakeSummary::release`] is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn then(self, result: Result<String, ServiceError>) -> Self {
        self.scripted.lock().unwrap().push_back(result);
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Record a violation whenever a call starts while `store` has an
    /// exchange in flight.
    pub fn watch(&self, store: Arc<ConversationStore>) {
        *self.probe.lock().unwrap() = Some(store);
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn transcripts(&self) -> Vec<String> {
        self.transcripts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }
}

#[async_trait]
impl SummaryService for FakeSummary {
    async fn summarize(&self, transcript: &str) -> Result<String, ServiceError> {
        if let Some(store) = self.probe.lock().unwrap().as_ref() {
            if store.exchange_in_flight() {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
        }
        let n = {
            let mut transcripts = self.transcripts.lock().unwrap();
            transcripts.push(transcript.to_string());
            transcripts.len()
        };
        let result = self
            .scripted
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("<div>summary {n}</div>")));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        result
    }
}

// =============================================================================
// History
// =============================================================================

pub struct FakeHistory {
    result: Result<SessionSnapshot, ServiceError>,
    calls: AtomicUsize,
}

impl FakeHistory {
    pub fn missing() -> Self {
        Self::failing(ServiceError::NotFound)
    }

    pub fn failing(error: ServiceError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(snapshot: SessionSnapshot) -> Self {
        Self {
            result: Ok(snapshot),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryStore for FakeHistory {
    async fn fetch(&self, _session: &SessionId) -> Result<SessionSnapshot, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
