use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Message, SummaryPayload};

/// Outcome of a successful exchange, as seen by the summary side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplySettled {
    pub query: String,
    pub reply: String,
    /// Document already rendered by the reasoning service, if any.
    pub rendered_document: Option<String>,
    /// Credit request the reply was about, if any.
    pub request_id: Option<String>,
}

/// Everything that happens to a session, in the order it happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    Hydrated { messages: usize },
    MessageAppended(Message),
    ExchangeStarted,
    ReplySettled(ReplySettled),
    ExchangeFailed { error: String },
    SummaryInstalled(SummaryPayload),
    SummaryFailed { error: String },
    RequestBound(String),
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(SessionEvent::ExchangeStarted);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::ExchangeStarted));
    }

    #[tokio::test]
    async fn multiple_subscribers_see_same_order() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(SessionEvent::ExchangeStarted);
        bus.publish(SessionEvent::ReplySettled(ReplySettled {
            query: "Hello".into(),
            reply: "Hi there".into(),
            rendered_document: None,
            request_id: None,
        }));

        for rx in [&mut rx1, &mut rx2] {
            assert!(matches!(rx.recv().await.unwrap(), SessionEvent::ExchangeStarted));
            let settled = rx.recv().await.unwrap();
            assert!(
                matches!(settled, SessionEvent::ReplySettled(ref s) if s.query == "Hello" && s.reply == "Hi there")
            );
        }
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(SessionEvent::ExchangeStarted), 0);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_value(SessionEvent::RequestBound("REQ-42".into())).unwrap();
        assert_eq!(json["type"], "RequestBound");
        assert_eq!(json["data"], "REQ-42");
    }
}
