//! Stage 2 — structured extraction through an external generative service.
//!
//! The service is modeled as a one-operation capability
//! ([`GenerativeBackend::submit`]) so the retry/backoff policy and response
//! sanitization in [`client::ExtractionClient`] are testable against a
//! scripted [`mock::MockBackend`] without any network dependency.

use thiserror::Error;

pub mod backend;
pub mod client;
pub mod gemini;
pub mod mock;
pub mod pacer;
pub mod prompt;
pub mod schema;

pub use backend::{GenerativeBackend, PageImage};
pub use client::{ClientConfig, ExtractionClient, ExtractionRequest};
pub use gemini::GeminiBackend;
pub use pacer::RequestPacer;
pub use prompt::build_prompt;
pub use schema::{EXTRACTION_SCHEMA, EXTRACTION_SCHEMA_VERSION};
// Re-export the canonical result type from core
pub use memoire_core::Stage2Result;

#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service error [{status}]: {message}")]
    Api { status: u16, message: String },
    #[error("empty response from service")]
    Empty,
}

impl GenAiError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, rate limiting and server-side errors are worth
    /// retrying; a 4xx (bad key, oversized payload) will fail the same way
    /// every time.
    pub fn is_transient(&self) -> bool {
        match self {
            GenAiError::Http(_) | GenAiError::Empty => true,
            GenAiError::Api { status, .. } => *status == 429 || *status >= 500,
        }
    }
}
