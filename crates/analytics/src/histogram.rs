//! Fixed-width CAGR histogram, optionally sub-grouped by a trial parameter.

use crate::error::AnalyticsError;
use crate::math::{MAX_EXACT_INTEGER, round_dp};
use core_types::{AnalyticsRecord, GroupingParam, compare_group_keys};
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Floors carry the same precision as `cagr_pct`.
const FLOOR_PRECISION: i32 = 10;

/// Quotients this close to an integer, relative to their magnitude, snap to it.
const SNAP_TOLERANCE: f64 = 1e-10;

/// Most bins [`Histogram::densify`] will materialize. Wider spans stay sparse.
pub const DENSE_BIN_LIMIT: u64 = 100_000;

/// A validated histogram bin width in percentage points.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct BinSize(f64);

impl BinSize {
    /// The widths offered to users. Any other positive width works just as well.
    pub const PRESETS: [f64; 4] = [1.0, 2.0, 5.0, 10.0];

    pub fn new(pct: f64) -> Result<Self, AnalyticsError> {
        if pct.is_finite() && pct > 0.0 {
            Ok(Self(pct))
        } else {
            Err(AnalyticsError::InvalidBinSize(pct))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Index of the bin holding `cagr_pct`, flooring toward negative infinity.
    ///
    /// Always integral, but kept as `f64` so CAGRs far beyond the `i64` range still
    /// get their own bin. Quotients within rounding noise of an integer snap to it,
    /// so `0.3 / 0.1` lands in bin 3, not bin 2. Non-finite input lands in bin 0.
    pub fn index_of(self, cagr_pct: f64) -> f64 {
        let quotient = cagr_pct / self.0;
        if !quotient.is_finite() {
            return 0.0;
        }
        let nearest = quotient.round();
        let index = if (quotient - nearest).abs() <= SNAP_TOLERANCE * quotient.abs().max(1.0) {
            nearest
        } else {
            quotient.floor()
        };
        // Folds -0.0 into 0.0.
        index + 0.0
    }

    pub fn floor_of(self, index: f64) -> f64 {
        round_dp(index * self.0, FLOOR_PRECISION)
    }
}

/// Total order over integral bin indices.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BinIndex(f64);

impl Eq for BinIndex {}

impl PartialOrd for BinIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BinIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One histogram bin: its lower edge and a count per group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub floor: f64,
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
}

impl Bin {
    pub fn new(floor: f64, counts: BTreeMap<String, u64>) -> Self {
        Self { floor, counts }
    }

    /// Count for `group`; `0` when the group has no entry in this bin.
    pub fn count(&self, group: &str) -> u64 {
        self.counts.get(group).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Bins sorted ascending by floor, plus the ordered set of group keys seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bin_size: BinSize,
    pub bins: Vec<Bin>,
    pub group_keys: Vec<String>,
}

/// Bins records by `cagr_pct`, counting each record under its group key.
///
/// Only non-empty bins are produced; see [`Histogram::densify`] for a gap-free axis.
pub fn bin_records(
    records: &[AnalyticsRecord],
    bin_size: BinSize,
    group_by: GroupingParam,
) -> Histogram {
    let mut by_index: BTreeMap<BinIndex, BTreeMap<String, u64>> = BTreeMap::new();
    for record in records {
        *by_index
            .entry(BinIndex(bin_size.index_of(record.cagr_pct)))
            .or_default()
            .entry(group_by.group_key(record))
            .or_insert(0) += 1;
    }

    let group_keys = by_index
        .values()
        .flat_map(|counts| counts.keys())
        .unique()
        .sorted_by(|a, b| compare_group_keys(a, b))
        .cloned()
        .collect();

    let bins = by_index
        .into_iter()
        .map(|(BinIndex(index), counts)| Bin::new(bin_size.floor_of(index), counts))
        .collect();

    Histogram { bin_size, bins, group_keys }
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Number of records binned under `group`.
    pub fn total(&self, group: &str) -> u64 {
        self.bins.iter().map(|bin| bin.count(group)).sum()
    }

    /// Number of records binned across all groups.
    pub fn grand_total(&self) -> u64 {
        self.bins.iter().map(Bin::total).sum()
    }

    /// Materializes every bin between the lowest and highest floor, each carrying
    /// every observed group key with a zero count where it is empty.
    ///
    /// Spans wider than [`DENSE_BIN_LIMIT`] bins, or beyond the range where adjacent
    /// indices are distinct floats, are returned sparse with a warning.
    pub fn densify(&self) -> Histogram {
        let (Some(first), Some(last)) = (self.bins.first(), self.bins.last()) else {
            return self.clone();
        };
        let index_of_floor = |floor: f64| (floor / self.bin_size.get()).round();
        let (low, high) = (index_of_floor(first.floor), index_of_floor(last.floor));
        let span = high - low;
        if !(span < DENSE_BIN_LIMIT as f64)
            || low.abs() > MAX_EXACT_INTEGER
            || high.abs() > MAX_EXACT_INTEGER
        {
            tracing::warn!(
                low = first.floor,
                high = last.floor,
                limit = DENSE_BIN_LIMIT,
                "CAGR range too wide to fill empty bins; keeping the sparse histogram."
            );
            return self.clone();
        }

        // Both ends are exact integers well inside the i64 range here.
        let (low, high) = (low as i64, high as i64);
        let existing: BTreeMap<i64, &Bin> = self
            .bins
            .iter()
            .map(|bin| (index_of_floor(bin.floor) as i64, bin))
            .collect();

        let bins = (low..=high)
            .map(|index| {
                let counts = self
                    .group_keys
                    .iter()
                    .map(|key| {
                        let count = existing.get(&index).map_or(0, |bin| bin.count(key));
                        (key.clone(), count)
                    })
                    .collect();
                Bin::new(self.bin_size.floor_of(index as f64), counts)
            })
            .collect();

        Histogram {
            bin_size: self.bin_size,
            bins,
            group_keys: self.group_keys.clone(),
        }
    }
}
