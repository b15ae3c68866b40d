//! # Optiscope Core Types
//!
//! The shared vocabulary of the workspace: the three result-set shapes produced by
//! the external optimizer, the trial records they carry, and the flat
//! `AnalyticsRecord` the analytics pipeline consumes.
//!
//! As a Layer 0 crate it depends on no other workspace crate.

pub mod enums;
pub mod error;
pub mod records;
pub mod result_set;

// Re-export the core types to provide a clean public API.
pub use enums::{GroupingParam, PeriodType, RecordType, ResultShape};
pub use error::CoreError;
pub use records::{
    ALL_GROUP, AnalyticsRecord, FieldValue, NOT_AVAILABLE, TrialRecord, compare_group_keys,
};
pub use result_set::{
    NormalResults, Period, PortfolioState, PortfolioSummary, ResultSet, TrainTestResults,
    WalkForwardResults, Window, WindowBounds, months_spanned,
};
