use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Result set is flagged as both walk-forward and train/test")]
    ConflictingModes,

    #[error("Malformed result set: {0}")]
    Malformed(#[from] serde_json::Error),
}
