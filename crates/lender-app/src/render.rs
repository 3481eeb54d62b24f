//! Plain-text rendering of messages, summaries and catalog records.

use chrono::Local;

use lender_common::{Message, Sender, SummaryPayload};
use lender_remote::catalog::format_usd;
use lender_remote::{CreditRequest, CreditRequestDetails};

/// Shown when a session has no messages. Never stored in the log.
pub const WELCOME: &str = "Hello! I'm your AI lending assistant. I can help you with loan \
applications, generate lending memos, and provide financial analysis. You can select a credit \
request with /requests and /select to get started, or ask me anything about lending. How can I \
assist you today?";

pub const HELP: &str = "\
Type a message to talk to the assistant.

  /requests            list credit requests
  /details <id>        show one credit request
  /select <id>         bind a credit request and prepare a prompt
  /section <name>      prepare a follow-up prompt for a summary section
  (empty line)         send the prepared prompt
  /refresh             regenerate the summary now
  /summary             print the current summary
  /new                 start a new session
  /session             print the session id
  /help                this help
  /quit                exit";

pub fn message(message: &Message) -> String {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Agent => "assistant",
    };
    format!(
        "[{}] {who}: {}",
        message.timestamp.with_timezone(&Local).format("%H:%M"),
        message.text
    )
}

pub fn summary(payload: &SummaryPayload) -> String {
    let mut out = format!("== {} ==\n", payload.title());
    if let Some(id) = &payload.bound_request_id {
        out.push_str(&format!("Credit request: {id}\n"));
    }
    match &payload.rendered_document {
        Some(document) => out.push_str(document),
        None => {
            out.push_str(&format!("Last query: {}\n", payload.last_query));
            out.push_str(&format!("Last response: {}", payload.last_response));
        }
    }
    out
}

/// One-line notice printed when a rendered summary is installed.
pub fn summary_notice(payload: &SummaryPayload) -> String {
    format!("({} updated; /summary to view)", payload.title())
}

pub fn request_list(requests: &[CreditRequest]) -> String {
    if requests.is_empty() {
        return "No credit requests available.".to_string();
    }
    requests
        .iter()
        .map(|r| format!("  {} [{}]", r.label(), r.status))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn details(d: &CreditRequestDetails) -> String {
    let mut lines = vec![
        format!("{} ({})", d.request_id, d.status),
        format!(
            "Borrower: {} | credit score {} | income {} | DTI {:.0}%",
            d.borrower.name,
            d.borrower.credit_score,
            dollars(d.borrower.annual_income),
            d.borrower.debt_to_income_ratio * 100.0
        ),
        format!(
            "Loan: {} for {} | risk {}",
            dollars(d.loan_amount),
            d.loan_purpose,
            d.risk_rating
        ),
        format!(
            "Pricing: {:.2}% over {} months, {} / month",
            d.pricing.interest_rate,
            d.pricing.loan_term_months,
            dollars(d.pricing.monthly_payment)
        ),
    ];
    if d.collateral_missing() {
        lines.push("Collateral: not provided".to_string());
    } else {
        lines.push(format!(
            "Collateral: {} at {}, valued {} (LTV {:.0}%)",
            d.collateral.property_type,
            d.collateral.address,
            dollars(d.collateral.property_value),
            d.collateral.ltv_ratio * 100.0
        ));
    }
    if !d.conditions.is_empty() {
        lines.push(format!("Conditions: {}", d.conditions.join("; ")));
    }
    lines.join("\n")
}

fn dollars(amount: f64) -> String {
    format_usd((amount * 100.0).round() as i64)
}
