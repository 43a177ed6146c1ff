//! Per-document orchestration of the two extraction stages.
//!
//! `START → STAGE1 → (SCANNED_SHORT_CIRCUIT | STAGE2) → MERGE → SCORE →
//! DONE`. The scanned short-circuit is the pipeline's main cost control: a
//! document Stage 1 classified as scanned never reaches the generative
//! service. A Stage 2 failure is soft — the document still yields a merged
//! record from whatever partial data exists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use memoire_core::{merge, score_record, MergedRecord, Stage1Result, Stage2Result};
use memoire_genai::{ExtractionClient, ExtractionRequest, PageImage};
use memoire_pdf::{analyze, AnalyzerConfig, PageRenderer, PageTextSource, PdfError};

pub mod batch;
pub mod config_file;

pub use batch::{process_batch, ProgressEvent};
pub use config_file::{load_config, ConfigFile, Settings};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error("background task failed: {0}")]
    Task(String),
}

/// Everything the pipeline produces for one document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub file_name: String,
    pub record: MergedRecord,
    pub confidence: f64,
    /// Stage 1 diagnostics, kept for callers that log or display them.
    pub stage1: Stage1Result,
    /// True when the scanned short-circuit skipped the service call.
    pub genai_skipped: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub analyzer: AnalyzerConfig,
    /// Render the first page and attach it to the extraction prompt.
    pub send_page_image: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            send_page_image: true,
        }
    }
}

/// One pipeline instance, shared across batch workers.
pub struct Pipeline {
    source: Arc<dyn PageTextSource>,
    renderer: Option<Arc<dyn PageRenderer>>,
    client: Arc<ExtractionClient>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn PageTextSource>,
        renderer: Option<Arc<dyn PageRenderer>>,
        client: Arc<ExtractionClient>,
        config: PipelineConfig,
    ) -> Self {
        Self { source, renderer, client, config }
    }

    /// Run the full pipeline for one document.
    ///
    /// Errors only when the document cannot be opened or the analyzer
    /// config is invalid; extraction-service trouble degrades to an empty
    /// Stage 2 inside the client.
    pub async fn process(&self, path: &Path) -> Result<DocumentReport, PipelineError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let stage1 = self.run_stage1(path).await?;

        let (stage2, genai_skipped) = if stage1.is_scanned {
            tracing::info!(file = %file_name, "scanned document, skipping extraction service");
            (Stage2Result::default(), true)
        } else {
            let request = self.build_request(path).await?;
            (self.client.extract(&request).await, false)
        };

        let record = merge(Some(&stage1), &stage2, &file_name);
        let confidence = score_record(&record);

        tracing::info!(
            file = %file_name,
            confidence,
            scanned = record.scanned_pdf,
            "document processed"
        );

        Ok(DocumentReport {
            file_name,
            record,
            confidence,
            stage1,
            genai_skipped,
        })
    }

    /// Stage 1 runs the blocking FFI extraction off the async runtime.
    async fn run_stage1(&self, path: &Path) -> Result<Stage1Result, PipelineError> {
        let source = Arc::clone(&self.source);
        let path = path.to_owned();
        let config = self.config.analyzer.clone();
        tokio::task::spawn_blocking(move || analyze(source.as_ref(), &path, &config))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?
            .map_err(PipelineError::from)
    }

    /// Assemble the Stage 2 request: leading page text plus, when enabled
    /// and available, the rendered first page. A render failure degrades to
    /// a text-only prompt.
    async fn build_request(&self, path: &Path) -> Result<ExtractionRequest, PipelineError> {
        let source = Arc::clone(&self.source);
        let renderer = if self.config.send_page_image {
            self.renderer.clone()
        } else {
            None
        };
        let path: PathBuf = path.to_owned();

        tokio::task::spawn_blocking(move || -> Result<ExtractionRequest, PdfError> {
            let total = source.page_count(&path)?;

            let first_pages = source.extract_range(&path, 0..total.min(2))?.join("\n");
            let early_pages = if total > 2 {
                let text = source.extract_range(&path, 2..total.min(4))?.join("\n");
                (!text.trim().is_empty()).then_some(text)
            } else {
                None
            };

            let page_image = renderer.and_then(|r| match r.render_page_png(&path, 0) {
                Ok(png) => Some(PageImage { png }),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "page render failed, sending text only");
                    None
                }
            });

            Ok(ExtractionRequest {
                first_pages,
                early_pages,
                page_image,
            })
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
        .map_err(PipelineError::from)
    }
}
