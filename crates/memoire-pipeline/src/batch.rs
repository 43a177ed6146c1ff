//! Bounded-concurrency batch processing.
//!
//! Document runs are independent and share no mutable state, so the batch
//! is a plain semaphore-gated fan-out: the permit count caps how many
//! pipeline runs (and therefore extraction-service calls) are in flight.
//! Cancellation discards pending and in-flight documents — no partial
//! record is ever returned for a cancelled run.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{DocumentReport, Pipeline};

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        index: usize,
        total: usize,
        file_name: String,
    },
    Finished {
        index: usize,
        total: usize,
        report: Box<DocumentReport>,
    },
    Failed {
        index: usize,
        total: usize,
        file_name: String,
        error: String,
    },
}

fn display_name(path: &PathBuf) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Process documents with at most `concurrency` pipelines in flight.
///
/// Returns the successful reports in input order. Failures are reported
/// via [`ProgressEvent::Failed`] and never abort the batch; cancelled
/// documents produce neither a report nor a Failed event.
pub async fn process_batch(
    pipeline: Arc<Pipeline>,
    paths: &[PathBuf],
    concurrency: usize,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
    cancel: CancellationToken,
) -> Vec<DocumentReport> {
    let total = paths.len();
    if total == 0 {
        return vec![];
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let progress: Arc<dyn Fn(ProgressEvent) + Send + Sync> = Arc::new(progress);
    let mut join_set = JoinSet::new();

    for (index, path) in paths.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let pipeline = Arc::clone(&pipeline);
        let progress = Arc::clone(&progress);
        let cancel = cancel.clone();

        join_set.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return None;
            };
            if cancel.is_cancelled() {
                return None;
            }

            let file_name = display_name(&path);
            progress(ProgressEvent::Started {
                index,
                total,
                file_name: file_name.clone(),
            });

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(file = %file_name, "cancelled, discarding partial results");
                    return None;
                }
                result = pipeline.process(&path) => result,
            };

            match result {
                Ok(report) => {
                    progress(ProgressEvent::Finished {
                        index,
                        total,
                        report: Box::new(report.clone()),
                    });
                    Some((index, report))
                }
                Err(error) => {
                    progress(ProgressEvent::Failed {
                        index,
                        total,
                        file_name,
                        error: error.to_string(),
                    });
                    None
                }
            }
        });
    }

    let mut indexed: Vec<(usize, DocumentReport)> = Vec::with_capacity(total);
    while let Some(joined) = join_set.join_next().await {
        if let Ok(Some(entry)) = joined {
            indexed.push(entry);
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, report)| report).collect()
}
