//! Reverse cumulative distribution: the share of each group at or above a floor.

use crate::histogram::Bin;
use crate::math::round_dp;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A point on the "at least X" curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CdfPoint {
    pub floor: f64,
    /// Percentage (0..=100, one decimal) of each group's records at or above `floor`.
    #[serde(flatten)]
    pub percentages: BTreeMap<String, f64>,
}

impl CdfPoint {
    pub fn percentage(&self, group: &str) -> Option<f64> {
        self.percentages.get(group).copied()
    }
}

/// Computes the reverse CDF of a histogram, returned ascending by floor.
///
/// Bins are accumulated from the highest floor down. A group whose total is zero
/// reports `0` everywhere.
pub fn reverse_cdf(bins: &[Bin]) -> Vec<CdfPoint> {
    let groups: BTreeSet<&str> = bins
        .iter()
        .flat_map(|bin| bin.counts.keys().map(String::as_str))
        .collect();
    let totals: BTreeMap<&str, u64> = groups
        .iter()
        .map(|&group| (group, bins.iter().map(|bin| bin.count(group)).sum()))
        .collect();

    let mut descending: Vec<&Bin> = bins.iter().collect();
    descending.sort_by(|a, b| b.floor.total_cmp(&a.floor));

    let mut running: BTreeMap<&str, u64> = BTreeMap::new();
    let mut points: Vec<CdfPoint> = descending
        .into_iter()
        .map(|bin| {
            let percentages = groups
                .iter()
                .map(|&group| {
                    let cumulative = running.entry(group).or_insert(0);
                    *cumulative += bin.count(group);
                    let total = totals.get(group).copied().unwrap_or(0);
                    let pct = if total == 0 {
                        0.0
                    } else {
                        round_dp(100.0 * *cumulative as f64 / total as f64, 1)
                    };
                    (group.to_string(), pct)
                })
                .collect();
            CdfPoint { floor: bin.floor, percentages }
        })
        .collect();

    points.sort_by(|a, b| a.floor.total_cmp(&b.floor));
    points
}
