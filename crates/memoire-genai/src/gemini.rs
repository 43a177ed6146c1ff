//! Gemini `generateContent` backend.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{json, Value};

use crate::backend::{GenerativeBackend, PageImage};
use crate::schema::EXTRACTION_SCHEMA;
use crate::GenAiError;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiBackend {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    fn request_body(&self, prompt: &str, image: Option<&PageImage>) -> Value {
        let mut parts = vec![json!({ "text": prompt })];
        if let Some(image) = image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": "image/png",
                    "data": BASE64.encode(&image.png),
                }
            }));
        }
        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "temperature": 0.1,
                "response_mime_type": "application/json",
                "response_schema": &*EXTRACTION_SCHEMA,
            }
        })
    }
}

impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn submit<'a>(
        &'a self,
        prompt: &'a str,
        image: Option<&'a PageImage>,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenAiError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{API_BASE}/{}:generateContent?key={}",
                self.model, self.api_key
            );
            let body = self.request_body(prompt, image);

            let resp = self
                .client
                .post(&url)
                .timeout(timeout)
                .json(&body)
                .send()
                .await?;

            let status = resp.status().as_u16();
            let payload: Value = resp.json().await?;
            if status >= 400 {
                let message = payload["error"]["message"]
                    .as_str()
                    .unwrap_or("unknown API error")
                    .to_string();
                return Err(GenAiError::Api { status, message });
            }

            let text = payload["candidates"][0]["content"]["parts"][0]["text"]
                .as_str()
                .unwrap_or("");
            if text.trim().is_empty() {
                return Err(GenAiError::Empty);
            }
            Ok(text.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_schema_and_json_mode() {
        let backend = GeminiBackend::new("test-key", "gemini-2.0-flash");
        let body = backend.request_body("extract", None);
        assert_eq!(
            body["generationConfig"]["response_mime_type"],
            "application/json"
        );
        assert!(body["generationConfig"]["response_schema"]["properties"]["thesis"].is_object());
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn image_part_is_inline_base64() {
        let backend = GeminiBackend::new("test-key", "gemini-2.0-flash");
        let image = PageImage { png: vec![0x89, 0x50, 0x4E, 0x47] };
        let body = backend.request_body("extract", Some(&image));
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], BASE64.encode([0x89u8, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn backend_name() {
        let backend = GeminiBackend::new("k", "gemini-2.0-flash");
        assert_eq!(backend.name(), "Gemini");
    }
}
