//! Retry, sanitization and lenient parsing around the generative backend.
//!
//! The client never raises to the pipeline: a document whose extraction
//! fails after the retry budget gets an explicit empty [`Stage2Result`] and
//! the pipeline carries on with Stage 1 data alone.

use std::sync::Arc;
use std::time::Duration;

use memoire_core::Stage2Result;
use serde_json::Value;

use crate::backend::{GenerativeBackend, PageImage};
use crate::pacer::RequestPacer;
use crate::prompt::{build_prompt, PromptSections};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Total attempt budget, first try included.
    pub max_attempts: u32,
    /// Delay before retry N is `base_delay × N`.
    pub base_delay: Duration,
    /// Per-request timeout handed to the backend.
    pub request_timeout: Duration,
    /// Character budget per prompt section.
    pub max_chars_per_section: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(90),
            max_chars_per_section: 6000,
        }
    }
}

/// Input for one extraction call, assembled by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    /// Text of the leading pages (cover, title page, jury list).
    pub first_pages: String,
    /// Optional follow-up pages.
    pub early_pages: Option<String>,
    /// Optional rendered first page.
    pub page_image: Option<PageImage>,
}

pub struct ExtractionClient {
    backend: Arc<dyn GenerativeBackend>,
    config: ClientConfig,
    pacer: Option<RequestPacer>,
}

impl ExtractionClient {
    pub fn new(backend: Arc<dyn GenerativeBackend>, config: ClientConfig) -> Self {
        Self { backend, config, pacer: None }
    }

    /// Space requests through the given pacer (shared across workers).
    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    /// Run the extraction call with retries.
    ///
    /// Retried: transport errors, 429/5xx, empty responses, and responses
    /// that do not parse as JSON (plausibly garbled output). Not retried: a
    /// 4xx the service will answer the same way every time. Either way the
    /// caller gets a result — possibly `Stage2Result::default()`.
    pub async fn extract(&self, request: &ExtractionRequest) -> Stage2Result {
        let sections = PromptSections {
            first_pages: &request.first_pages,
            early_pages: request.early_pages.as_deref(),
        };
        let prompt = build_prompt(&sections, self.config.max_chars_per_section);
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if let Some(pacer) = &self.pacer {
                pacer.acquire().await;
            }

            match self
                .backend
                .submit(&prompt, request.page_image.as_ref(), self.config.request_timeout)
                .await
            {
                Ok(text) => {
                    let cleaned = sanitize_response(&text);
                    match serde_json::from_str::<Value>(cleaned) {
                        Ok(value) => return stage2_from_value(&value),
                        Err(error) => {
                            tracing::warn!(
                                backend = self.backend.name(),
                                attempt,
                                %error,
                                "response is not valid JSON, retrying"
                            );
                        }
                    }
                }
                Err(error) if error.is_transient() => {
                    tracing::warn!(
                        backend = self.backend.name(),
                        attempt,
                        %error,
                        "transient extraction failure"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        backend = self.backend.name(),
                        %error,
                        "terminal extraction failure, returning empty result"
                    );
                    return Stage2Result::default();
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.config.base_delay * attempt).await;
            }
        }

        tracing::warn!(
            backend = self.backend.name(),
            attempts = max_attempts,
            "extraction retry budget exhausted, returning empty result"
        );
        Stage2Result::default()
    }
}

/// Strip surrounding Markdown code fences the service sometimes adds even
/// in JSON mode.
fn sanitize_response(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Group-wise lenient deserialization.
///
/// A group that fails its expected shape (e.g. `keywords` returned as a
/// string) degrades to its default; the other groups are kept as
/// best-effort partial data rather than discarding the whole response.
fn stage2_from_value(value: &Value) -> Stage2Result {
    match serde_json::from_value::<Stage2Result>(value.clone()) {
        Ok(result) => result,
        Err(error) => {
            tracing::debug!(%error, "strict parse failed, falling back to group-wise parse");
            Stage2Result {
                thesis: group(value, "thesis"),
                institution: group(value, "institution"),
                degree: group(value, "degree"),
                language: group(value, "language"),
                persons: group(value, "persons"),
                categories: group(value, "categories"),
                keywords: group(value, "keywords"),
                study_location: group(value, "study_location"),
                abstracts: group(value, "abstracts"),
                chapters: group(value, "chapters"),
                reference_count: group(value, "reference_count"),
            }
        }
    }
}

fn group<T>(value: &Value, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    value
        .get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}
