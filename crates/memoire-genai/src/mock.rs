//! Mock generative backend for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::{GenerativeBackend, PageImage};
use crate::GenAiError;

/// A configurable mock reply for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Simulate a successful response with the given text.
    Text(String),
    /// Simulate an empty response.
    Empty,
    /// Simulate a service error with the given HTTP status.
    ApiError { status: u16, message: String },
}

impl MockReply {
    pub fn json(text: &str) -> Self {
        MockReply::Text(text.to_string())
    }

    pub fn transient() -> Self {
        MockReply::ApiError { status: 503, message: "model overloaded".into() }
    }

    pub fn terminal() -> Self {
        MockReply::ApiError { status: 400, message: "invalid request".into() }
    }
}

/// A hand-rolled mock implementing [`GenerativeBackend`] for tests.
///
/// Supports:
/// - A fixed reply (used for every call), **or**
/// - A sequence of replies (one per call, repeating the last if exhausted).
/// - Optional per-call latency.
/// - Call counting via [`call_count()`](MockBackend::call_count).
pub struct MockBackend {
    /// If non-empty, each call pops the next reply (last is repeated).
    replies: Mutex<Vec<MockReply>>,
    /// Fallback when the sequence is empty (or single-reply mode).
    fallback: MockReply,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockBackend {
    /// Create a mock that always returns `reply`.
    pub fn new(reply: MockReply) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            fallback: reply,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns replies in order, repeating the last one.
    pub fn with_sequence(mut replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "sequence must have at least one reply");
        // Reverse so we can pop() from the front cheaply.
        replies.reverse();
        let fallback = replies.first().cloned().unwrap();
        Self {
            replies: Mutex::new(replies),
            fallback,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `submit()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockReply {
        let mut seq = self.replies.lock().unwrap();
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl GenerativeBackend for MockBackend {
    fn name(&self) -> &str {
        "Mock"
    }

    fn submit<'a>(
        &'a self,
        _prompt: &'a str,
        _image: Option<&'a PageImage>,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenAiError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }

            match reply {
                MockReply::Text(text) => Ok(text),
                MockReply::Empty => Err(GenAiError::Empty),
                MockReply::ApiError { status, message } => {
                    Err(GenAiError::Api { status, message })
                }
            }
        })
    }
}
