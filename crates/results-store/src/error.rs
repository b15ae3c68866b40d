use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File does not contain JSON data after the '# JSON DATA' marker.")]
    MissingPayload,

    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognised result set: {0}")]
    Ingest(#[from] core_types::CoreError),
}
