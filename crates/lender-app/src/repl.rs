//! Line-oriented front end driving the session registry.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use lender_common::{Sender, SessionEvent};
use lender_remote::CreditCatalog;
use lender_session::{ExchangeError, RefreshError, Session, SessionRegistry};

use crate::command::{self, Command};
use crate::render;

pub struct Repl {
    registry: Arc<SessionRegistry>,
    catalog: Arc<dyn CreditCatalog>,
    session: Arc<Session>,
    renderer: JoinHandle<()>,
    /// Prompt seeded by `/select` or `/section`, sent on an empty line.
    draft: Option<String>,
}

impl Repl {
    pub fn new(
        registry: Arc<SessionRegistry>,
        catalog: Arc<dyn CreditCatalog>,
        session: Arc<Session>,
    ) -> Self {
        let renderer = spawn_renderer(&session);
        Self {
            registry,
            catalog,
            session,
            renderer,
            draft: None,
        }
    }

    pub async fn run(mut self) -> std::io::Result<()> {
        self.show_session();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if !self.handle(command::parse(&line)).await {
                break;
            }
        }

        self.renderer.abort();
        self.session.shutdown().await;
        Ok(())
    }

    /// Returns false when the loop should stop.
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Send(text) => self.send(&text).await,
            Command::SendDraft => match self.draft.take() {
                Some(draft) => self.send(&draft).await,
                None => debug!("empty line with no draft"),
            },
            Command::Select(id) => {
                let draft = self.session.select_request(&id);
                println!("Bound to {id}. Press Enter to send:\n  {draft}");
                self.draft = Some(draft);
            }
            Command::Section(name) => {
                let draft = self.session.section_draft(&name);
                println!("Press Enter to send:\n  {draft}");
                self.draft = Some(draft);
            }
            Command::Requests => match self.catalog.list().await {
                Ok(requests) => println!("{}", render::request_list(&requests)),
                Err(e) => println!("Could not load credit requests: {e}"),
            },
            Command::Details(id) => match self.catalog.details(&id).await {
                Ok(details) => println!("{}", render::details(&details)),
                Err(e) if e.is_not_found() => println!("No credit request {id}."),
                Err(e) => println!("Could not load {id}: {e}"),
            },
            Command::Refresh => match self.session.refresh().await {
                Ok(_) => {}
                Err(RefreshError::EmptyConversation) => println!("Nothing to summarize yet."),
                Err(RefreshError::Remote(e)) => {
                    warn!(error = %e, "manual summary refresh failed");
                    println!("Summary unavailable right now; the conversation is unaffected.");
                }
                Err(e) => println!("Cannot refresh: {e}."),
            },
            Command::Summary => match self.session.summary() {
                Some(payload) => println!("{}", render::summary(&payload)),
                None => println!("No summary yet."),
            },
            Command::New => {
                let session = self.registry.start_new().await;
                self.switch_to(session);
            }
            Command::Session => println!("{}", self.session.id()),
            Command::Help => println!("{}", render::HELP),
            Command::Quit => return false,
            Command::Usage(usage) => println!("Usage: {usage}"),
            Command::Unknown(name) => println!("Unknown command /{name}. Try /help."),
        }
        true
    }

    async fn send(&mut self, text: &str) {
        match self.session.send(text).await {
            // Replies and the apology are printed by the renderer.
            Ok(_) | Err(ExchangeError::Remote(_)) => {}
            Err(ExchangeError::Inactive) => println!("This session was closed."),
            Err(e) => println!("Not sent: {e}."),
        }
    }

    fn switch_to(&mut self, session: Arc<Session>) {
        self.renderer.abort();
        self.renderer = spawn_renderer(&session);
        self.session = session;
        self.draft = None;
        self.show_session();
    }

    fn show_session(&self) {
        println!("Session {}", self.session.id());
        let messages = self.session.messages();
        if messages.is_empty() {
            println!("{}", render::WELCOME);
        }
        for message in &messages {
            println!("{}", render::message(message));
        }
        if let Some(id) = self.session.bound_request() {
            println!("(working on credit request {id})");
        }
    }
}

/// Print agent messages and summary updates as they happen.
fn spawn_renderer(session: &Session) -> JoinHandle<()> {
    let mut events = session.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::MessageAppended(message)) if message.sender == Sender::Agent => {
                    println!("{}", render::message(&message));
                }
                Ok(SessionEvent::SummaryInstalled(payload)) if payload.generated => {
                    println!("{}", render::summary_notice(&payload));
                }
                Ok(SessionEvent::SummaryFailed { error }) => {
                    debug!(%error, "summary not updated");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer fell behind session events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
