//! HTTP backend for every remote collaborator.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  /chat-history/{session}`: history fetch
//! - `POST /chat`: reasoning exchange
//! - `POST /generate-summary`: summary generation
//! - `GET  /credit-requests` and `GET /credit-requests/{id}`: catalog

mod api;
mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::HttpBackend;
pub use config::BackendConfig;
