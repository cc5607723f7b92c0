use crate::config::ConfigStore;
use crate::downloader::DownloadCoordinator;
use crate::error::Result;
use crate::fetcher::SourceFetcher;
use crate::http::{HttpClient, ReqwestClient};
use crate::maintenance::Maintenance;
use crate::models::DownloadResults;
use crate::report::ReportBuilder;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Process exit code when every source succeeded.
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit code when any source failed or the run could not start.
pub const EXIT_FAILURE: i32 = 1;

/// Entry point used by the command line: one download run, or a status
/// report of what is already on disk.
///
/// # Examples
///
/// ```no_run
/// use iptv_manager::{ConfigStore, IptvManager};
///
/// async fn example() {
///     let store = ConfigStore::load("config.json").unwrap();
///     let manager = IptvManager::new(store).unwrap();
///     let exit_code = manager.run().await;
/// }
/// ```
pub struct IptvManager {
    store: ConfigStore,
    coordinator: DownloadCoordinator,
    maintenance: Maintenance,
    reports: ReportBuilder,
}

impl IptvManager {
    /// Creates the manager with a reqwest-backed HTTP client.
    ///
    /// # Errors
    /// * If the directory layout cannot be created
    /// * If the HTTP client cannot be built
    pub fn new(store: ConfigStore) -> Result<Self> {
        let client = ReqwestClient::new(&store.config().download)?;
        Self::with_client(store, Arc::new(client))
    }

    /// Creates the manager around an existing HTTP client.
    pub fn with_client(store: ConfigStore, client: Arc<dyn HttpClient>) -> Result<Self> {
        let config = store.config();
        config.directories.create_all()?;

        let fetcher = SourceFetcher::from_config(config, client);
        let coordinator = DownloadCoordinator::new(Arc::new(fetcher), config.download.max_workers);
        let maintenance = Maintenance::from_config(config);
        let reports = ReportBuilder::new(
            config.directories.data_path(),
            config.directories.log_path(),
        );

        info!(config = %store.path().display(), "Manager initialized");
        Ok(Self {
            store,
            coordinator,
            maintenance,
            reports,
        })
    }

    /// Cleans up, downloads every enabled source and saves a report.
    ///
    /// Returns the outcomes of the run.
    #[instrument(skip(self))]
    pub async fn download(&self) -> DownloadResults {
        info!("Starting playlist update");

        self.maintenance.run().await;

        let sources = self.store.enabled_sources();
        let results = self.coordinator.run_all(&sources).await;

        self.reports.save(&results).await;
        results
    }

    /// Runs [`download`](Self::download) and maps the outcome to an exit code.
    pub async fn run(&self) -> i32 {
        let results = self.download().await;

        if results.all_succeeded() {
            info!("All sources updated");
            EXIT_SUCCESS
        } else {
            warn!(failed = %results.failed_ids().join(", "), "Some sources failed");
            EXIT_FAILURE
        }
    }

    /// Report of the playlists currently on disk, without downloading.
    pub fn status(&self) -> String {
        self.reports.build(&DownloadResults::default())
    }
}
