use crate::cdf::CdfPoint;
use crate::histogram::Bin;
use core_types::{GroupingParam, PeriodType, RecordType};
use serde::Serialize;

/// The complete output of one analytics pass, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub periods: Vec<PeriodType>,
    pub record_type: RecordType,
    pub group_by: GroupingParam,
    pub bin_size_pct: f64,
    /// Number of normalized records that went into the histogram.
    pub record_count: usize,
    /// Group labels in display order.
    pub group_keys: Vec<String>,
    pub histogram: Vec<Bin>,
    pub reverse_cdf: Vec<CdfPoint>,
}

impl AnalyticsReport {
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Share of `group`'s records at or above the lowest floor at or over `cagr_pct`.
    ///
    /// Reads the curve as a step function; `None` when no floor reaches `cagr_pct`.
    pub fn share_at_least(&self, group: &str, cagr_pct: f64) -> Option<f64> {
        self.reverse_cdf
            .iter()
            .find(|point| point.floor >= cagr_pct)
            .and_then(|point| point.percentage(group))
    }
}
