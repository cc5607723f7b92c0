use std::path::PathBuf;

/// One enabled playlist source, resolved from configuration for a single run.
///
/// There is no `enabled` flag: it lives on [`SourceConfig`](crate::config::SourceConfig)
/// and disabled entries never become definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDefinition {
    pub id: String,
    pub name: String,
    pub url: String,
    pub filename: String,
}

impl SourceDefinition {
    /// First required field left empty by the configuration, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.url.trim().is_empty() {
            Some("url")
        } else if self.filename.trim().is_empty() {
            Some("filename")
        } else {
            None
        }
    }
}

/// Result of fetching one source in one run.
///
/// `error` is empty on success and carries the last error message on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub source_id: String,
    pub name: String,
    pub success: bool,
    pub error: String,
}

impl DownloadOutcome {
    pub fn success(source: &SourceDefinition) -> Self {
        Self {
            source_id: source.id.clone(),
            name: source.name.clone(),
            success: true,
            error: String::new(),
        }
    }

    pub fn failure(source: &SourceDefinition, error: impl Into<String>) -> Self {
        Self {
            source_id: source.id.clone(),
            name: source.name.clone(),
            success: false,
            error: error.into(),
        }
    }
}

/// Outcomes of one run, kept in source order rather than completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadResults {
    outcomes: Vec<DownloadOutcome>,
}

impl DownloadResults {
    pub fn new(outcomes: Vec<DownloadOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter()
    }

    pub fn get(&self, source_id: &str) -> Option<&DownloadOutcome> {
        self.outcomes.iter().find(|o| o.source_id == source_id)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.source_id.as_str())
            .collect()
    }
}

/// A playlist that has been written to the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPlaylist {
    pub path: PathBuf,
    pub bytes: usize,
    pub channels: usize,
    pub backup: Option<PathBuf>,
}
