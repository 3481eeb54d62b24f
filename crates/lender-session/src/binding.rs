//! Draft prompts for working on a credit request.
//!
//! These only produce text for the next send. Nothing is checked against
//! the catalog.

pub fn bind(request_id: &str) -> String {
    format!("Continue the work for the credit request ID: {request_id}")
}

/// Follow-up prompt for one section of the summary document.
pub fn bind_section(section_name: &str) -> String {
    format!("Continue working on {section_name}")
}
