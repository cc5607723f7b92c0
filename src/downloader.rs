use crate::fetcher::SourceFetcher;
use crate::models::{DownloadOutcome, DownloadResults, SourceDefinition};
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs every enabled source through a bounded pool of fetch workers.
///
/// # Fields
/// * `fetcher` - Shared per-source download logic
/// * `max_workers` - Upper bound on concurrently running fetches
pub struct DownloadCoordinator {
    fetcher: Arc<SourceFetcher>,
    max_workers: usize,
}

impl DownloadCoordinator {
    pub fn new(fetcher: Arc<SourceFetcher>, max_workers: usize) -> Self {
        Self {
            fetcher,
            max_workers,
        }
    }

    /// Pool size for a run over `source_count` sources.
    pub fn worker_count(&self, source_count: usize) -> usize {
        source_count.min(self.max_workers).max(1)
    }

    /// Fetches all `sources` and collects one outcome per source.
    ///
    /// # Details
    /// * At most `min(sources, max_workers)` fetches run at once
    /// * Every fetch runs to completion; one failure never cancels another
    /// * A fetch task that panics is reported as a failed outcome
    /// * Outcomes come back in the order of `sources`
    pub async fn run_all(&self, sources: &[SourceDefinition]) -> DownloadResults {
        if sources.is_empty() {
            warn!("No enabled sources");
            return DownloadResults::default();
        }

        let workers = self.worker_count(sources.len());
        info!(sources = sources.len(), workers, "Starting downloads");

        let mut outcomes: Vec<(usize, DownloadOutcome)> =
            stream::iter(sources.iter().cloned().enumerate())
                .map(|(index, source)| {
                    let fetcher = Arc::clone(&self.fetcher);
                    async move {
                        let task = tokio::spawn({
                            let source = source.clone();
                            async move { fetcher.fetch(&source).await }
                        });

                        let outcome = match task.await {
                            Ok(outcome) => outcome,
                            Err(e) => {
                                let message = if e.is_panic() {
                                    format!("download task panicked: {}", panic_message(e.into_panic()))
                                } else {
                                    format!("download task failed: {}", e)
                                };
                                error!(source = %source.id, error = %message, "Download task aborted");
                                DownloadOutcome::failure(&source, message)
                            }
                        };
                        (index, outcome)
                    }
                })
                .buffer_unordered(workers)
                .collect()
                .await;

        outcomes.sort_by_key(|(index, _)| *index);
        let results = DownloadResults::new(outcomes.into_iter().map(|(_, o)| o).collect());

        info!(
            succeeded = results.success_count(),
            total = results.len(),
            "Downloads finished"
        );
        results
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}
