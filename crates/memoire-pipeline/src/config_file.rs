//! On-disk TOML configuration.
//!
//! All fields are optional so partial configs work: the platform config
//! (`<config_dir>/memoire/config.toml`) is overlaid by a CWD `.memoire.toml`,
//! and anything still unset falls back to the built-in defaults when the
//! file is resolved into [`Settings`].

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use memoire_genai::ClientConfig;
use memoire_pdf::AnalyzerConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub analyzer: Option<AnalyzerSection>,
    pub genai: Option<GenAiSection>,
    pub batch: Option<BatchSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerSection {
    pub max_pages: Option<usize>,
    pub min_text_ratio: Option<f64>,
    pub abstract_pages: Option<usize>,
    pub abstract_window_chars: Option<usize>,
    pub toc_page_start: Option<usize>,
    pub toc_page_end: Option<usize>,
    pub toc_max_items: Option<usize>,
    pub ref_tail_pages: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenAiSection {
    pub model: Option<String>,
    /// Prefer the GEMINI_API_KEY environment variable over this field.
    pub api_key: Option<String>,
    pub max_chars_per_section: Option<usize>,
    pub max_attempts: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub requests_per_second: Option<u32>,
    pub send_page_image: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSection {
    pub concurrency: Option<usize>,
}

/// Platform config path: `<config_dir>/memoire/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("memoire").join("config.toml"))
}

/// Load config by cascading CWD `.memoire.toml` over the platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".memoire.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

fn pick<T: Clone>(overlay: &Option<T>, base: &Option<T>) -> Option<T> {
    overlay.clone().or_else(|| base.clone())
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let ab = base.analyzer.unwrap_or_default();
    let ao = overlay.analyzer.unwrap_or_default();
    let gb = base.genai.unwrap_or_default();
    let go = overlay.genai.unwrap_or_default();
    let bb = base.batch.unwrap_or_default();
    let bo = overlay.batch.unwrap_or_default();

    ConfigFile {
        analyzer: Some(AnalyzerSection {
            max_pages: pick(&ao.max_pages, &ab.max_pages),
            min_text_ratio: pick(&ao.min_text_ratio, &ab.min_text_ratio),
            abstract_pages: pick(&ao.abstract_pages, &ab.abstract_pages),
            abstract_window_chars: pick(&ao.abstract_window_chars, &ab.abstract_window_chars),
            toc_page_start: pick(&ao.toc_page_start, &ab.toc_page_start),
            toc_page_end: pick(&ao.toc_page_end, &ab.toc_page_end),
            toc_max_items: pick(&ao.toc_max_items, &ab.toc_max_items),
            ref_tail_pages: pick(&ao.ref_tail_pages, &ab.ref_tail_pages),
        }),
        genai: Some(GenAiSection {
            model: pick(&go.model, &gb.model),
            api_key: pick(&go.api_key, &gb.api_key),
            max_chars_per_section: pick(&go.max_chars_per_section, &gb.max_chars_per_section),
            max_attempts: pick(&go.max_attempts, &gb.max_attempts),
            retry_base_delay_ms: pick(&go.retry_base_delay_ms, &gb.retry_base_delay_ms),
            request_timeout_secs: pick(&go.request_timeout_secs, &gb.request_timeout_secs),
            requests_per_second: pick(&go.requests_per_second, &gb.requests_per_second),
            send_page_image: pick(&go.send_page_image, &gb.send_page_image),
        }),
        batch: Some(BatchSection {
            concurrency: pick(&bo.concurrency, &bb.concurrency),
        }),
    }
}

/// Resolved configuration with every default applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub analyzer: AnalyzerConfig,
    pub client: ClientConfig,
    pub model: String,
    pub api_key: Option<String>,
    pub requests_per_second: u32,
    pub send_page_image: bool,
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_file(&ConfigFile::default())
    }
}

impl Settings {
    pub fn from_file(file: &ConfigFile) -> Self {
        let analyzer_section = file.analyzer.clone().unwrap_or_default();
        let genai_section = file.genai.clone().unwrap_or_default();
        let batch_section = file.batch.clone().unwrap_or_default();

        let defaults = AnalyzerConfig::default();
        let analyzer = AnalyzerConfig {
            max_pages: analyzer_section.max_pages.unwrap_or(defaults.max_pages),
            min_text_ratio: analyzer_section
                .min_text_ratio
                .unwrap_or(defaults.min_text_ratio),
            abstract_pages: analyzer_section
                .abstract_pages
                .unwrap_or(defaults.abstract_pages),
            abstract_window_chars: analyzer_section
                .abstract_window_chars
                .unwrap_or(defaults.abstract_window_chars),
            toc_page_start: analyzer_section
                .toc_page_start
                .unwrap_or(defaults.toc_page_start),
            toc_page_end: analyzer_section
                .toc_page_end
                .unwrap_or(defaults.toc_page_end),
            toc_max_items: analyzer_section
                .toc_max_items
                .unwrap_or(defaults.toc_max_items),
            ref_tail_pages: analyzer_section
                .ref_tail_pages
                .unwrap_or(defaults.ref_tail_pages),
        };

        let client_defaults = ClientConfig::default();
        let client = ClientConfig {
            max_attempts: genai_section
                .max_attempts
                .unwrap_or(client_defaults.max_attempts),
            base_delay: genai_section
                .retry_base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(client_defaults.base_delay),
            request_timeout: genai_section
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(client_defaults.request_timeout),
            max_chars_per_section: genai_section
                .max_chars_per_section
                .unwrap_or(client_defaults.max_chars_per_section),
        };

        Self {
            analyzer,
            client,
            model: genai_section
                .model
                .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            api_key: genai_section.api_key,
            requests_per_second: genai_section.requests_per_second.unwrap_or(1),
            send_page_image: genai_section.send_page_image.unwrap_or(true),
            concurrency: batch_section.concurrency.unwrap_or(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_resolves_to_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.analyzer.max_pages, 15);
        assert_eq!(settings.client.max_attempts, 3);
        assert_eq!(settings.model, "gemini-2.0-flash");
        assert_eq!(settings.concurrency, 4);
        assert!(settings.send_page_image);
    }

    #[test]
    fn partial_toml_parses() {
        let file: ConfigFile = toml::from_str(
            r#"
            [genai]
            model = "gemini-2.5-pro"
            max_attempts = 5

            [batch]
            concurrency = 8
            "#,
        )
        .unwrap();
        let settings = Settings::from_file(&file);
        assert_eq!(settings.model, "gemini-2.5-pro");
        assert_eq!(settings.client.max_attempts, 5);
        assert_eq!(settings.concurrency, 8);
        // untouched sections keep their defaults
        assert_eq!(settings.analyzer.ref_tail_pages, 6);
    }

    #[test]
    fn overlay_wins_in_merge() {
        let base: ConfigFile = toml::from_str(
            r#"
            [genai]
            model = "gemini-2.0-flash"
            max_attempts = 3
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [genai]
            model = "gemini-2.5-pro"
            "#,
        )
        .unwrap();
        let merged = merge(base, overlay);
        let genai = merged.genai.unwrap();
        assert_eq!(genai.model.as_deref(), Some("gemini-2.5-pro"));
        // base value survives where overlay is silent
        assert_eq!(genai.max_attempts, Some(3));
    }

    #[test]
    fn retry_delay_parsed_from_millis() {
        let file: ConfigFile = toml::from_str(
            r#"
            [genai]
            retry_base_delay_ms = 500
            "#,
        )
        .unwrap();
        let settings = Settings::from_file(&file);
        assert_eq!(settings.client.base_delay, Duration::from_millis(500));
    }
}
