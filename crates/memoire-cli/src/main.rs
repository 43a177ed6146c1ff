use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use memoire_genai::{ExtractionClient, GeminiBackend, RequestPacer};
use memoire_pdf_mupdf::MupdfSource;
use memoire_pipeline::{
    load_config, process_batch, DocumentReport, Pipeline, PipelineConfig, ProgressEvent, Settings,
};

mod output;

use output::{ColorMode, RecordEnvelope};

/// Thesis metadata extractor - catalog records from academic PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract metadata from a single thesis PDF
    Extract {
        /// Path to the PDF file
        file_path: PathBuf,

        /// Gemini API key (defaults to the GEMINI_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Model to use for the extraction call
        #[arg(long)]
        model: Option<String>,

        /// Write the record JSON to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run the page-signal analysis only, without calling the service
        #[arg(long)]
        dry_run: bool,

        /// Do not attach the rendered first page to the prompt
        #[arg(long)]
        no_page_image: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Process every PDF in a directory
    Batch {
        /// Directory containing the PDFs
        dir: PathBuf,

        /// Directory to write one JSON record per document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gemini API key (defaults to the GEMINI_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Model to use for the extraction calls
        #[arg(long)]
        model: Option<String>,

        /// How many documents to process concurrently
        #[arg(long)]
        concurrency: Option<usize>,

        /// Do not attach rendered pages to the prompts
        #[arg(long)]
        no_page_image: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("memoire=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            file_path,
            api_key,
            model,
            output,
            dry_run,
            no_page_image,
            no_color,
        } => {
            extract(
                file_path, api_key, model, output, dry_run, no_page_image, no_color,
            )
            .await
        }
        Command::Batch {
            dir,
            output,
            api_key,
            model,
            concurrency,
            no_page_image,
            no_color,
        } => batch(dir, output, api_key, model, concurrency, no_page_image, no_color).await,
    }
}

/// Resolve settings from the config file cascade, then env, then flags.
fn resolve_settings(
    api_key: Option<String>,
    model: Option<String>,
    concurrency: Option<usize>,
    no_page_image: bool,
) -> Settings {
    let mut settings = Settings::from_file(&load_config());

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        settings.api_key = Some(key);
    }
    if let Ok(model) = std::env::var("MEMOIRE_MODEL") {
        settings.model = model;
    }
    if let Some(key) = api_key {
        settings.api_key = Some(key);
    }
    if let Some(model) = model {
        settings.model = model;
    }
    if let Some(n) = concurrency {
        settings.concurrency = n;
    }
    if no_page_image {
        settings.send_page_image = false;
    }
    settings
}

fn build_pipeline(settings: &Settings) -> anyhow::Result<Pipeline> {
    let api_key = settings.api_key.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured. Pass --api-key, set GEMINI_API_KEY, or add it to the config file."
        )
    })?;

    let source = Arc::new(MupdfSource::new());
    let backend = Arc::new(GeminiBackend::new(api_key, settings.model.clone()));
    let client = ExtractionClient::new(backend, settings.client.clone())
        .with_pacer(RequestPacer::per_second(settings.requests_per_second));

    Ok(Pipeline::new(
        source.clone(),
        Some(source),
        Arc::new(client),
        PipelineConfig {
            analyzer: settings.analyzer.clone(),
            send_page_image: settings.send_page_image,
        },
    ))
}

async fn extract(
    file_path: PathBuf,
    api_key: Option<String>,
    model: Option<String>,
    output: Option<PathBuf>,
    dry_run: bool,
    no_page_image: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(file_path.exists(), "file not found: {}", file_path.display());

    let settings = resolve_settings(api_key, model, None, no_page_image);
    let use_color = !no_color && output.is_none();
    let color = ColorMode(use_color);

    if dry_run {
        return dry_run_extract(&file_path, &settings, color);
    }

    let pipeline = build_pipeline(&settings)?;

    let report = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            anyhow::bail!("cancelled");
        }
        result = pipeline.process(&file_path) => result?,
    };

    let json = serde_json::to_string_pretty(&RecordEnvelope::new(&report))?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            let mut stdout = std::io::stdout();
            output::print_report_line(&mut stdout, &report, color)?;
            eprintln!("record written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Stage 1 only: print the page signals, touch no network.
fn dry_run_extract(
    file_path: &PathBuf,
    settings: &Settings,
    color: ColorMode,
) -> anyhow::Result<()> {
    let source = MupdfSource::new();
    let stage1 = memoire_pdf::analyze(&source, file_path, &settings.analyzer)?;

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut stdout = std::io::stdout();
    output::print_stage1_summary(&mut stdout, &file_name, &stage1, color)?;
    Ok(())
}

async fn batch(
    dir: PathBuf,
    output: Option<PathBuf>,
    api_key: Option<String>,
    model: Option<String>,
    concurrency: Option<usize>,
    no_page_image: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(dir.is_dir(), "not a directory: {}", dir.display());

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    paths.sort();
    anyhow::ensure!(!paths.is_empty(), "no PDF files in {}", dir.display());

    if let Some(ref out_dir) = output {
        std::fs::create_dir_all(out_dir)?;
    }

    let settings = resolve_settings(api_key, model, concurrency, no_page_image);
    let pipeline = Arc::new(build_pipeline(&settings)?);

    // Ctrl-C cancels pending documents; in-flight ones are discarded.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling batch");
                cancel.cancel();
            }
        });
    }

    let total = paths.len();
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .expect("static template is valid"),
    );

    let failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let progress = {
        let bar = bar.clone();
        let failures = Arc::clone(&failures);
        move |event: ProgressEvent| match event {
            ProgressEvent::Started { file_name, .. } => bar.set_message(file_name),
            ProgressEvent::Finished { .. } => bar.inc(1),
            ProgressEvent::Failed { file_name, error, .. } => {
                failures.lock().unwrap().push(format!("{file_name}: {error}"));
                bar.inc(1);
            }
        }
    };

    let reports = process_batch(
        Arc::clone(&pipeline),
        &paths,
        settings.concurrency,
        progress,
        cancel.clone(),
    )
    .await;
    bar.finish_and_clear();

    let color = ColorMode(!no_color);
    let mut stdout = std::io::stdout();
    for report in &reports {
        output::print_report_line(&mut stdout, report, color)?;
        if let Some(ref out_dir) = output {
            write_record(out_dir, report)?;
        }
    }

    let failures = failures.lock().unwrap();
    for failure in failures.iter() {
        eprintln!("failed: {failure}");
    }

    let scanned = reports.iter().filter(|r| r.record.scanned_pdf).count();
    let mean_confidence = if reports.is_empty() {
        None
    } else {
        Some(reports.iter().map(|r| r.confidence).sum::<f64>() / reports.len() as f64)
    };
    output::print_batch_summary(
        &mut stdout,
        reports.len(),
        failures.len(),
        scanned,
        mean_confidence,
    )?;

    if cancel.is_cancelled() {
        anyhow::bail!("batch cancelled");
    }
    Ok(())
}

fn write_record(out_dir: &PathBuf, report: &DocumentReport) -> anyhow::Result<()> {
    let stem = PathBuf::from(&report.file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.file_name.clone());
    let path = out_dir.join(format!("{stem}.json"));
    let mut file = std::fs::File::create(&path)?;
    let json = serde_json::to_string_pretty(&RecordEnvelope::new(report))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
