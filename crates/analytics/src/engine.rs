use crate::cdf::reverse_cdf;
use crate::error::AnalyticsError;
use crate::histogram::{BinSize, bin_records};
use crate::normalizer::{Selection, normalize};
use crate::report::AnalyticsReport;
use configuration::AnalysisSettings;
use core_types::{AnalyticsRecord, GroupingParam, ResultSet};

/// A stateless calculator that runs the normalize → bin → reverse-CDF pipeline.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    selection: Selection,
    bin_size: BinSize,
    group_by: GroupingParam,
    fill_empty_bins: bool,
}

impl AnalyticsEngine {
    /// Builds an engine from the `[analysis]` settings.
    pub fn new(settings: &AnalysisSettings) -> Result<Self, AnalyticsError> {
        let selection = Selection::from(settings);
        if selection.is_empty() {
            return Err(AnalyticsError::EmptySelection);
        }
        Ok(Self {
            selection,
            bin_size: BinSize::new(settings.bin_size_pct)?,
            group_by: settings.group_by,
            fill_empty_bins: settings.fill_empty_bins,
        })
    }

    pub fn with_parts(selection: Selection, bin_size: BinSize, group_by: GroupingParam) -> Self {
        Self {
            selection,
            bin_size,
            group_by,
            fill_empty_bins: false,
        }
    }

    pub fn fill_empty_bins(mut self, fill: bool) -> Self {
        self.fill_empty_bins = fill;
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Analyzes a single result set.
    pub fn analyze(&self, set: &ResultSet) -> AnalyticsReport {
        let records = normalize(set, &self.selection);
        self.analyze_records(&records)
    }

    /// Merges `sets` and analyzes the merged population.
    ///
    /// # Errors
    ///
    /// Fails when the sets do not all share one shape.
    pub fn analyze_many(&self, sets: &[ResultSet]) -> Result<AnalyticsReport, AnalyticsError> {
        let merged = merger::merge(sets)?;
        Ok(self.analyze(&merged))
    }

    /// Bins already-normalized records and derives their reverse CDF.
    pub fn analyze_records(&self, records: &[AnalyticsRecord]) -> AnalyticsReport {
        let mut histogram = bin_records(records, self.bin_size, self.group_by);
        if self.fill_empty_bins {
            histogram = histogram.densify();
        }
        let reverse_cdf = reverse_cdf(&histogram.bins);

        tracing::info!(
            records = records.len(),
            bins = histogram.bins.len(),
            groups = histogram.group_keys.len(),
            "Analytics pass complete."
        );

        AnalyticsReport {
            periods: self.selection.periods().to_vec(),
            record_type: self.selection.record_type(),
            group_by: self.group_by,
            bin_size_pct: self.bin_size.get(),
            record_count: records.len(),
            group_keys: histogram.group_keys,
            histogram: histogram.bins,
            reverse_cdf,
        }
    }
}
