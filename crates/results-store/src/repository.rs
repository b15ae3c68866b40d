use crate::connection::resolve_results_dir;
use crate::error::StoreError;
use crate::payload::extract_payload;
use core_types::ResultSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File extensions the optimizer saves results under.
const RESULT_EXTENSIONS: [&str; 2] = ["txt", "json"];

/// Read access to the directory of saved optimization results.
#[derive(Debug, Clone)]
pub struct ResultsRepository {
    root: PathBuf,
}

impl ResultsRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Opens the repository at the resolved results directory.
    pub fn from_configured(configured: Option<&Path>) -> Self {
        Self::new(resolve_results_dir(configured))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saved result files in the repository, sorted by file name.
    pub async fn list(&self) -> Result<Vec<PathBuf>, StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io { path: self.root.clone(), source };
        let mut entries = fs::read_dir(&self.root).await.map_err(io_err)?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            let is_result = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| RESULT_EXTENSIONS.contains(&ext));
            if is_result && entry.file_type().await.map_err(io_err)?.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        tracing::debug!(dir = %self.root.display(), files = files.len(), "Listed saved results.");
        Ok(files)
    }

    /// Resolves `name` against the repository root unless it is already a path to a file.
    pub async fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        // An unreadable candidate is treated as absent and looked up under the root.
        if name.is_absolute() || fs::try_exists(name).await.unwrap_or(false) {
            name.to_path_buf()
        } else {
            self.root.join(name)
        }
    }

    /// Reads and ingests one saved result file.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<ResultSet, StoreError> {
        let path = self.resolve(path).await;
        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        let set = ResultSet::from_value(extract_payload(&content)?)?;
        tracing::info!(
            file = %path.display(),
            shape = %set.shape(),
            trials = set.trial_count(),
            "Loaded result set."
        );
        Ok(set)
    }
}
