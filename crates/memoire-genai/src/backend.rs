use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::GenAiError;

/// A rendered page handed to the service alongside the prompt, for
/// documents where layout carries signal the text stream loses.
#[derive(Clone)]
pub struct PageImage {
    pub png: Vec<u8>,
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

/// A generative extraction service that can answer a prompt with text.
///
/// One operation, no streaming: submit the combined prompt (plus an
/// optional page image) and get the raw response text back. Sanitization,
/// JSON parsing and retries all live in the client, not in backends.
pub trait GenerativeBackend: Send + Sync {
    /// The canonical name of this backend (e.g., "Gemini").
    fn name(&self) -> &str;

    /// Submit a prompt to the service.
    fn submit<'a>(
        &'a self,
        prompt: &'a str,
        image: Option<&'a PageImage>,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenAiError>> + Send + 'a>>;
}
