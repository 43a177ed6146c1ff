use std::io::Write;

use memoire_core::{MergedRecord, Stage1Result};
use memoire_pipeline::DocumentReport;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// What crosses the pipeline boundary: the record plus its score.
#[derive(Debug, Serialize)]
pub struct RecordEnvelope<'a> {
    pub confidence: f64,
    pub record: &'a MergedRecord,
}

impl<'a> RecordEnvelope<'a> {
    pub fn new(report: &'a DocumentReport) -> Self {
        Self {
            confidence: report.confidence,
            record: &report.record,
        }
    }
}

/// Print the Stage 1 signals for a dry run.
pub fn print_stage1_summary(
    w: &mut dyn Write,
    file_name: &str,
    stage1: &Stage1Result,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Page signals for {}", file_name)?;
    writeln!(
        w,
        "  pages: {} total, {} checked, {} with text (coverage {:.2})",
        stage1.total_pages,
        stage1.pages_checked,
        stage1.pages_with_text,
        stage1.text_coverage_ratio
    )?;

    if stage1.is_scanned {
        let label = "scanned document — structural analysis skipped";
        if color.enabled() {
            writeln!(w, "  {}", label.yellow())?;
        } else {
            writeln!(w, "  {}", label)?;
        }
        return Ok(());
    }

    for (lang, text) in [
        ("fr", &stage1.abstracts.fr),
        ("en", &stage1.abstracts.en),
        ("ar", &stage1.abstracts.ar),
    ] {
        if let Some(text) = text {
            writeln!(w, "  abstract[{}]: {} chars", lang, text.chars().count())?;
        }
    }
    if let Some(items) = &stage1.toc_items {
        writeln!(w, "  toc: {} entries", items.len())?;
    }
    if let Some(count) = stage1.reference_count {
        writeln!(w, "  references: ~{}", count)?;
    }
    writeln!(w, "  keywords marker: {}", stage1.has_keyword_marker)?;
    Ok(())
}

/// One-line result for a processed document.
pub fn print_report_line(
    w: &mut dyn Write,
    report: &DocumentReport,
    color: ColorMode,
) -> std::io::Result<()> {
    let confidence = format!("{:.2}", report.confidence);
    let title = report
        .record
        .thesis
        .any_title()
        .unwrap_or("<no title extracted>");

    if color.enabled() {
        let confidence = if report.confidence >= 0.5 {
            confidence.green().to_string()
        } else {
            confidence.red().to_string()
        };
        let scanned = if report.record.scanned_pdf {
            " [scanned]".yellow().to_string()
        } else {
            String::new()
        };
        writeln!(w, "{} {}{} — {}", confidence, report.file_name.bold(), scanned, title)
    } else {
        let scanned = if report.record.scanned_pdf { " [scanned]" } else { "" };
        writeln!(w, "{} {}{} — {}", confidence, report.file_name, scanned, title)
    }
}

/// Aggregate line after a batch run.
pub fn print_batch_summary(
    w: &mut dyn Write,
    processed: usize,
    failed: usize,
    scanned: usize,
    mean_confidence: Option<f64>,
) -> std::io::Result<()> {
    write!(w, "{} processed, {} failed, {} scanned", processed, failed, scanned)?;
    if let Some(mean) = mean_confidence {
        write!(w, ", mean confidence {:.2}", mean)?;
    }
    writeln!(w)
}
