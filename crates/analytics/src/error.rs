use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Histogram bin size must be a positive number of percentage points, got {0}")]
    InvalidBinSize(f64),

    #[error("At least one period must be selected for extraction")]
    EmptySelection,

    #[error("Failed to merge result sets: {0}")]
    Merge(#[from] merger::MergeError),
}
