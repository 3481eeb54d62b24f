//! The orchestrator task and its handle.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lender_common::{EventBus, ReplySettled, SessionEvent, SummaryPayload};
use lender_remote::SummaryService;

use crate::exchange::APOLOGY;
use crate::store::{ConversationStore, GenerationGuard};

use super::state::{RefreshError, SummaryState};

/// Delay between a settled reply and automatic generation.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySettings {
    pub settle_delay: Duration,
    /// When false, only manual refreshes and embedded documents produce
    /// rendered summaries.
    pub auto_generate: bool,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            auto_generate: true,
        }
    }
}

enum Command {
    Refresh(oneshot::Sender<Result<SummaryPayload, RefreshError>>),
}

/// Talks to a running orchestrator.
#[derive(Clone)]
pub struct SummaryHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SummaryState>,
}

impl SummaryHandle {
    /// Generate now, bypassing the settle delay. Accepted from `Idle` only;
    /// a request made while a generation runs is evaluated after it ends.
    pub async fn refresh(&self) -> Result<SummaryPayload, RefreshError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Refresh(reply))
            .await
            .map_err(|_| RefreshError::Closed)?;
        rx.await.map_err(|_| RefreshError::Closed)?
    }

    pub fn state(&self) -> SummaryState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SummaryState> {
        self.state.clone()
    }
}

/// Start the orchestrator for `store`.
///
/// `events` must be subscribed before any exchange can run on the
/// session, otherwise early settles are missed.
pub fn spawn(
    store: Arc<ConversationStore>,
    summary: Arc<dyn SummaryService>,
    bus: EventBus,
    events: broadcast::Receiver<SessionEvent>,
    settings: SummarySettings,
    cancel: CancellationToken,
) -> (SummaryHandle, JoinHandle<()>) {
    let (commands_tx, commands_rx) = mpsc::channel(8);
    let (state_tx, state_rx) = watch::channel(SummaryState::Idle);

    let orchestrator = Orchestrator {
        store,
        summary,
        bus,
        settings,
        state: state_tx,
        debounce: None,
    };
    let task = tokio::spawn(orchestrator.run(events, commands_rx, cancel));

    (
        SummaryHandle {
            commands: commands_tx,
            state: state_rx,
        },
        task,
    )
}

struct Orchestrator {
    store: Arc<ConversationStore>,
    summary: Arc<dyn SummaryService>,
    bus: EventBus,
    settings: SummarySettings,
    state: watch::Sender<SummaryState>,
    /// Pending settle delay. Dropping it cancels the timer.
    debounce: Option<Pin<Box<Sleep>>>,
}

impl Orchestrator {
    async fn run(
        mut self,
        mut events: broadcast::Receiver<SessionEvent>,
        mut commands: mpsc::Receiver<Command>,
        cancel: CancellationToken,
    ) {
        let session = self.store.session().clone();
        debug!(session = %session, "summary orchestrator started");

        if self.settings.auto_generate && !self.store.is_empty() && self.store.needs_generation() {
            debug!(session = %session, "restored log has no rendered summary");
            self.arm();
        }

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                event = events.recv() => match event {
                    Ok(event) => self.on_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session = %session, skipped, "summary orchestrator lagged behind events");
                        self.resync();
                    }
                    Err(RecvError::Closed) => break,
                },

                command = commands.recv() => match command {
                    Some(Command::Refresh(reply)) => {
                        let result = self.refresh().await;
                        let _ = reply.send(result);
                    }
                    None => break,
                },

                () = elapsed(&mut self.debounce) => self.on_settle_delay_elapsed().await,
            }
        }

        self.debounce = None;
        self.set_state(SummaryState::Idle);
        debug!(session = %session, "summary orchestrator stopped");
    }

    fn on_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ExchangeStarted => {
                if self.debounce.take().is_some() {
                    debug!(session = %self.store.session(), "settle delay superseded by new exchange");
                    self.set_state(SummaryState::Idle);
                }
            }
            SessionEvent::ReplySettled(settled) => self.on_settled(settled),
            SessionEvent::ExchangeFailed { .. } => {
                debug!(session = %self.store.session(), "failed exchange, no summary");
            }
            _ => {}
        }
    }

    fn on_settled(&mut self, settled: ReplySettled) {
        if !self.store.is_active() {
            return;
        }
        let bound = settled
            .request_id
            .clone()
            .or_else(|| self.store.bound_request());

        match settled.rendered_document {
            Some(document) => {
                self.debounce = None;
                self.install(SummaryPayload::rendered(
                    settled.query,
                    settled.reply,
                    document,
                    bound,
                ));
                self.set_state(SummaryState::Idle);
            }
            None => {
                self.install_pending(settled.query, settled.reply, bound);
                if self.settings.auto_generate && !self.store.exchange_in_flight() {
                    self.arm();
                }
            }
        }
    }

    /// Rebuild state from the store after missed events.
    fn resync(&mut self) {
        if self.store.exchange_in_flight() {
            if self.debounce.take().is_some() {
                self.set_state(SummaryState::Idle);
            }
            return;
        }
        if !self.store.is_active() || self.store.is_empty() || self.debounce.is_some() {
            return;
        }

        let (query, reply) = self.store.last_exchange();
        // A failed exchange ends with the apology and is never summarized.
        if reply == APOLOGY {
            return;
        }
        let stale = self
            .store
            .summary()
            .map_or(true, |s| s.last_query != query || s.last_response != reply);
        if stale {
            debug!(session = %self.store.session(), "summary behind the log after lag");
            self.install_pending(query, reply, self.store.bound_request());
        }
        if self.settings.auto_generate && self.store.needs_generation() {
            self.arm();
        }
    }

    async fn on_settle_delay_elapsed(&mut self) {
        self.debounce = None;
        if !self.store.is_active() || !self.store.needs_generation() {
            self.set_state(SummaryState::Idle);
            return;
        }
        match self.store.try_begin_generation() {
            Some(guard) => {
                let _ = self.generate(guard).await;
            }
            None => {
                debug!(session = %self.store.session(), "exchange in flight, generation skipped");
                self.set_state(SummaryState::Idle);
            }
        }
    }

    async fn refresh(&mut self) -> Result<SummaryPayload, RefreshError> {
        if !self.store.is_active() {
            return Err(RefreshError::Closed);
        }
        let state = *self.state.borrow();
        if state != SummaryState::Idle {
            return Err(RefreshError::NotIdle(state));
        }
        if self.store.is_empty() {
            return Err(RefreshError::EmptyConversation);
        }
        let guard = self
            .store
            .try_begin_generation()
            .ok_or(RefreshError::ExchangeInFlight)?;
        self.generate(guard).await
    }

    async fn generate(&mut self, guard: GenerationGuard) -> Result<SummaryPayload, RefreshError> {
        self.set_state(SummaryState::Generating);
        let session = self.store.session().clone();
        let transcript = self.store.transcript();
        let (query, reply) = self.store.last_exchange();
        debug!(session = %session, bytes = transcript.len(), "generating summary");

        let outcome = self.summary.summarize(&transcript).await;
        drop(guard);

        let result = match outcome {
            Ok(document) if self.store.is_active() => {
                let payload =
                    SummaryPayload::rendered(query, reply, document, self.store.bound_request());
                self.install(payload.clone());
                info!(session = %session, "summary installed");
                Ok(payload)
            }
            Ok(_) => {
                warn!(session = %session, "discarding summary for inactive session");
                Err(RefreshError::Closed)
            }
            Err(e) => {
                warn!(session = %session, error = %e, "summary generation failed, keeping previous summary");
                self.bus.publish(SessionEvent::SummaryFailed {
                    error: e.to_string(),
                });
                Err(RefreshError::Remote(e))
            }
        };
        self.set_state(SummaryState::Idle);
        result
    }

    fn arm(&mut self) {
        self.debounce = Some(Box::pin(tokio::time::sleep(self.settings.settle_delay)));
        self.set_state(SummaryState::PendingDebounce);
    }

    /// Record a settled exchange that has no document of its own. The last
    /// rendered document stays visible until a generation replaces it.
    fn install_pending(&self, query: String, reply: String, bound: Option<String>) {
        let mut payload = SummaryPayload::pending(query, reply);
        payload.bound_request_id = bound;
        payload.rendered_document = self.store.summary().and_then(|s| s.rendered_document);
        self.install(payload);
    }

    fn install(&self, payload: SummaryPayload) {
        self.store.install_summary(payload.clone());
        self.bus.publish(SessionEvent::SummaryInstalled(payload));
    }

    fn set_state(&self, state: SummaryState) {
        self.state.send_replace(state);
    }
}

/// Resolves when the settle delay fires; never, when none is armed.
async fn elapsed(debounce: &mut Option<Pin<Box<Sleep>>>) {
    match debounce {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}
