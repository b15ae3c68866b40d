use core_types::ResultShape;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("Cannot merge result set #{index} ({found}) into {expected} results")]
    ShapeMismatch {
        index: usize,
        expected: ResultShape,
        found: ResultShape,
    },
}
