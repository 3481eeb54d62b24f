use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lender_common::{Sender, SessionId};

use super::*;
use crate::{
    CreditCatalog, CreditStatus, ExchangeRequest, HistoryStore, ReasoningService, ServiceError,
    SummaryService,
};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(BackendConfig::new(server.uri())).unwrap()
}

fn sid(raw: &str) -> SessionId {
    SessionId::parse(raw).unwrap()
}

#[tokio::test]
async fn exchange_posts_message_and_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({"message": "Hello", "sessionId": "chat_1000_abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Hi there",
            "team_mode": "fast_single_agent",
            "summary_generated": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend(&server)
        .exchange(&ExchangeRequest {
            message: "Hello".into(),
            session_id: sid("chat_1000_abc"),
        })
        .await
        .unwrap();
    assert_eq!(reply.response, "Hi there");
    assert!(reply.rendered_document().is_none());
}

#[tokio::test]
async fn exchange_server_error_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(500)))
        .mount(&server)
        .await;

    let err = backend(&server)
        .exchange(&ExchangeRequest {
            message: "Hello".into(),
            session_id: sid("chat_1"),
        })
        .await
        .unwrap_err();
    match err {
        ServiceError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn summarize_sends_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-summary"))
        .and(body_json(json!({"message": "user: Hello\nagent: Hi there"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"html_summary": "<div>memo</div>"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let doc = backend(&server)
        .summarize("user: Hello\nagent: Hi there")
        .await
        .unwrap();
    assert_eq!(doc, "<div>memo</div>");
}

#[tokio::test]
async fn summarize_bad_json_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-summary"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = backend(&server).summarize("user: hi").await.unwrap_err();
    assert!(matches!(err, ServiceError::Malformed(_)));
}

#[tokio::test]
async fn history_fetch_decodes_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-history/chat_1000_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chatId": "chat_1000_abc",
            "messages": [
                {"id": "msg_1", "text": "Hello", "sender": "user", "timestamp": "2024-05-01T09:30:15.123456"},
                {"id": "msg_2", "text": "Hi there", "sender": "agent", "timestamp": "2024-05-01T09:30:16.000001"}
            ],
            "summaryData": null,
            "selectedRequestId": "US-123456-2024"
        })))
        .mount(&server)
        .await;

    let snapshot = backend(&server)
        .fetch(&sid("chat_1000_abc"))
        .await
        .unwrap();
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[0].sender, Sender::User);
    assert!(snapshot.summary.is_none());
    assert_eq!(snapshot.bound_request_id.as_deref(), Some("US-123456-2024"));
}

#[tokio::test]
async fn history_missing_session_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-history/chat_2000_new"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Chat session not found"})),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .fetch(&sid("chat_2000_new"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn history_session_id_is_path_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-history/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = backend(&server).fetch(&sid("a/b")).await.unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn catalog_list_and_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/credit-requests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"request_id": "US-100200-3000", "borrower_name": "John Smith", "loan_amount": 250000.0, "status": "pending"},
            {"request_id": "US-100200-3003", "borrower_name": "Emily Davis", "loan_amount": 320000.0, "status": "approved"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/credit-requests/US-100200-3000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "US-100200-3000",
            "borrower": {
                "name": "John Smith", "credit_score": 742, "annual_income": 95000.0,
                "debt_to_income_ratio": 0.28, "employment_history": "8 years",
                "assets": 180000.0, "liabilities": 25000.0
            },
            "collateral": {
                "property_type": "Single Family Residence", "property_value": 332500.0,
                "ltv_ratio": 0.75, "appraisal_date": "2024-01-10", "address": "Denver"
            },
            "pricing": {
                "interest_rate": 6.5, "loan_term_months": 360, "monthly_payment": 1580.17,
                "origination_fee": 2500.0, "processing_fee": 500.0, "total_fees": 3000.0
            },
            "loan_amount": 250000.0,
            "loan_purpose": "Home Purchase",
            "status": "pending",
            "risk_rating": "Low"
        })))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let list = backend.list().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].status, CreditStatus::Approved);

    let details = backend.details("US-100200-3000").await.unwrap();
    assert_eq!(details.borrower.name, "John Smith");
    assert!(details.conditions.is_empty());
    assert!(!details.collateral_missing());
}

#[tokio::test]
async fn unreachable_server_is_transport_failure() {
    let config = BackendConfig::new("http://127.0.0.1:1")
        .with_connect_timeout(Duration::from_millis(200))
        .with_request_timeout(Duration::from_millis(500));
    let backend = HttpBackend::new(config).unwrap();
    let err = backend.list().await.unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(HttpBackend::new(BackendConfig::new("not a url")).is_err());
    assert!(HttpBackend::new(BackendConfig::new("mailto:ops@example.com")).is_err());
}

#[test]
fn endpoint_joins_segments_onto_base_path() {
    let backend = HttpBackend::new(BackendConfig::new("https://api.example.com/lending/")).unwrap();
    let url = backend.endpoint(&["chat-history", "chat_1"]).unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/lending/chat-history/chat_1");
}
