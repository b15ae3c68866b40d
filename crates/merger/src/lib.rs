//! # Optiscope Result-Set Merger
//!
//! Combines independently produced result sets of the same shape into one, so that
//! several optimizer runs can be analyzed as a single population.
//!
//! - **Normal:** trial lists are concatenated; `total_tests`/`completed_tests` are summed.
//! - **Train/Test:** every array is concatenated independently. Index alignment between
//!   `train_results`, `test_results` and `scores` only holds within each source set.
//! - **Walk-Forward:** windows are concatenated and `total_windows` recomputed. Window
//!   numbers are not renumbered and may repeat.
//!
//! Before merging, every input is copied and annotated with its `test_period_months`
//! (see [`annotate_test_period`]); the inputs themselves are never modified.

pub mod annotate;
pub mod error;

pub use annotate::annotate_test_period;
pub use error::MergeError;

use core_types::{NormalResults, ResultSet, ResultShape, TrainTestResults, WalkForwardResults};

/// Merges result sets that all share the first set's shape.
///
/// A single set is returned unchanged and an empty slice yields an empty normal set.
pub fn merge(sets: &[ResultSet]) -> Result<ResultSet, MergeError> {
    let Some(first) = sets.first() else {
        return Ok(ResultSet::default());
    };

    let expected = first.shape();
    for (index, set) in sets.iter().enumerate().skip(1) {
        let found = set.shape();
        if found != expected {
            return Err(MergeError::ShapeMismatch { index, expected, found });
        }
    }

    if sets.len() == 1 {
        return Ok(first.clone());
    }

    let annotated = sets.iter().map(annotate_test_period);
    let merged = match expected {
        ResultShape::Normal => ResultSet::Normal(merge_normal(
            annotated
                .filter_map(|set| match set {
                    ResultSet::Normal(normal) => Some(normal),
                    _ => None,
                })
                .collect(),
        )),
        ResultShape::TrainTest => ResultSet::TrainTest(merge_train_test(
            annotated
                .filter_map(|set| match set {
                    ResultSet::TrainTest(split) => Some(split),
                    _ => None,
                })
                .collect(),
        )),
        ResultShape::WalkForward => ResultSet::WalkForward(merge_walk_forward(
            annotated
                .filter_map(|set| match set {
                    ResultSet::WalkForward(walk) => Some(walk),
                    _ => None,
                })
                .collect(),
        )),
    };

    tracing::info!(
        sets = sets.len(),
        shape = %expected,
        trials = merged.trial_count(),
        "Merged result sets."
    );
    Ok(merged)
}

fn merge_normal(sets: Vec<NormalResults>) -> NormalResults {
    let mut iter = sets.into_iter();
    let Some(mut merged) = iter.next() else {
        return NormalResults::default();
    };
    for set in iter {
        merged.results.extend(set.results);
        merged.total_tests += set.total_tests;
        merged.completed_tests += set.completed_tests;
    }
    merged
}

fn merge_train_test(sets: Vec<TrainTestResults>) -> TrainTestResults {
    let carries_all = sets
        .iter()
        .any(|s| s.all_train_results.is_some() || s.all_test_results.is_some());
    let carries_all_scores = sets.iter().any(|s| s.all_scores.is_some());

    let mut iter = sets.into_iter();
    let Some(first) = iter.next() else {
        return TrainTestResults::default();
    };

    // The first set's period metadata stands in for the merged whole.
    let mut merged = TrainTestResults {
        all_train_results: carries_all.then(Vec::new),
        all_test_results: carries_all.then(Vec::new),
        all_scores: carries_all_scores.then(Vec::new),
        train_period: first.train_period,
        test_period: first.test_period,
        test_period_months: first.test_period_months,
        extra: first.extra.clone(),
        ..Default::default()
    };

    for set in std::iter::once(first).chain(iter) {
        if let Some(all) = merged.all_train_results.as_mut() {
            all.extend(set.all_train_results.unwrap_or_else(|| set.train_results.clone()));
        }
        if let Some(all) = merged.all_test_results.as_mut() {
            all.extend(set.all_test_results.unwrap_or_else(|| set.test_results.clone()));
        }
        if let Some(all) = merged.all_scores.as_mut() {
            all.extend(set.all_scores.unwrap_or_else(|| set.scores.clone()));
        }
        merged.train_results.extend(set.train_results);
        merged.test_results.extend(set.test_results);
        merged.scores.extend(set.scores);
        merged.total_tests += set.total_tests;
        merged.completed_tests += set.completed_tests;
    }
    merged
}

fn merge_walk_forward(sets: Vec<WalkForwardResults>) -> WalkForwardResults {
    let mut iter = sets.into_iter();
    let Some(mut merged) = iter.next() else {
        return WalkForwardResults::default();
    };
    // Capital chains of independent runs do not compose.
    merged.portfolio_summary = None;
    for set in iter {
        merged.windows.extend(set.windows);
    }
    merged.total_windows = merged.windows.len();
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn set(value: Value) -> ResultSet {
        ResultSet::from_value(value).unwrap()
    }

    fn normal(cagrs: &[f64], total_tests: u64) -> ResultSet {
        let results: Vec<Value> = cagrs.iter().map(|c| json!({ "cagr": c })).collect();
        set(json!({
            "results": results,
            "total_tests": total_tests,
            "completed_tests": cagrs.len()
        }))
    }

    fn walk_forward(window_numbers: &[u32], test_months: u32) -> ResultSet {
        let windows: Vec<Value> = window_numbers
            .iter()
            .map(|n| json!({ "window_number": n, "test_results": [{ "cagr": 0.1 }], "scores": [1.0] }))
            .collect();
        set(json!({
            "walk_forward_mode": true,
            "windows": windows,
            "train_period_months": 12,
            "test_period_months": test_months,
            "step_months": 6,
            "total_windows": window_numbers.len(),
            "portfolio_summary": { "initial_capital": 10000, "final_capital": 12000 }
        }))
    }

    #[test]
    fn a_single_set_is_returned_unchanged() {
        let only = walk_forward(&[1, 2], 6);
        assert_eq!(merge(std::slice::from_ref(&only)).unwrap(), only);

        let plain = normal(&[0.1, 0.2], 5);
        assert_eq!(merge(std::slice::from_ref(&plain)).unwrap(), plain);
    }

    #[test]
    fn no_sets_merge_into_an_empty_normal_set() {
        assert_eq!(merge(&[]).unwrap(), ResultSet::default());
    }

    #[test]
    fn normal_sets_concatenate_trials_and_sum_totals() {
        let merged = merge(&[normal(&[0.1, 0.2, 0.3], 10), normal(&[0.4, 0.5], 7)]).unwrap();
        let ResultSet::Normal(normal) = merged else {
            panic!("expected a normal set");
        };
        assert_eq!(normal.results.len(), 5);
        assert_eq!(normal.total_tests, 17);
        assert_eq!(normal.completed_tests, 5);
        let cagrs: Vec<_> = normal.results.iter().filter_map(|t| t.cagr).collect();
        assert_eq!(cagrs, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
    }

    #[test]
    fn bare_arrays_merge_with_wrapped_results() {
        let merged = merge(&[set(json!([{ "cagr": 0.1 }])), normal(&[0.2, 0.3], 4)]).unwrap();
        assert_eq!(merged.trial_count(), 3);
        let ResultSet::Normal(normal) = merged else {
            panic!("expected a normal set");
        };
        assert_eq!(normal.total_tests, 5);
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let err = merge(&[normal(&[0.1], 1), walk_forward(&[1], 6)]).unwrap_err();
        assert_eq!(
            err,
            MergeError::ShapeMismatch {
                index: 1,
                expected: ResultShape::Normal,
                found: ResultShape::WalkForward,
            }
        );
    }

    #[test]
    fn train_test_arrays_concatenate_independently() {
        let first = set(json!({
            "train_test_mode": true,
            "train_results": [{ "cagr": 0.1 }],
            "test_results": [{ "cagr": 0.05 }],
            "scores": [80.0],
            "all_train_results": [{ "cagr": 0.1 }, { "cagr": -0.1 }],
            "all_test_results": [{ "cagr": 0.05 }, { "cagr": -0.02 }],
            "all_scores": [80.0, 10.0],
            "train_period": { "start": "2020-01-01", "end": "2020-12-31" },
            "test_period": { "start": "2021-01-01", "end": "2021-06-30" },
            "total_tests": 2,
            "completed_tests": 2,
            "test_period_months": 6
        }));
        let second = set(json!({
            "train_test_mode": true,
            "train_results": [{ "cagr": 0.2 }, { "cagr": 0.3 }],
            "test_results": [{ "cagr": 0.1 }, { "cagr": 0.15 }],
            "scores": [70.0, 60.0],
            "train_period": { "start": "2019-01-01", "end": "2019-12-31" },
            "test_period": { "start": "2020-01-01", "end": "2020-03-31" },
            "total_tests": 3,
            "completed_tests": 2,
            "test_period_months": 3
        }));

        let ResultSet::TrainTest(merged) = merge(&[first, second]).unwrap() else {
            panic!("expected a train/test set");
        };
        assert_eq!(merged.train_results.len(), 3);
        assert_eq!(merged.test_results.len(), 3);
        assert_eq!(merged.scores, vec![80.0, 70.0, 60.0]);
        // The second set has no full history, so its top arrays stand in.
        assert_eq!(merged.all_train_results.as_ref().map(Vec::len), Some(4));
        assert_eq!(merged.all_test_results.as_ref().map(Vec::len), Some(4));
        assert_eq!(merged.all_scores, Some(vec![80.0, 10.0, 70.0, 60.0]));
        assert_eq!(merged.total_tests, 5);
        assert_eq!(merged.completed_tests, 4);
        // First set's period metadata is representative.
        assert_eq!(merged.test_period_months, Some(6));
        assert_eq!(merged.test_period.and_then(|p| p.months()), Some(6));
        // Each trial remembers where it came from.
        let months: Vec<_> = merged.test_results.iter().map(|t| t.test_period_months).collect();
        assert_eq!(months, vec![Some(6), Some(3), Some(3)]);
    }

    #[test]
    fn walk_forward_windows_concatenate_without_renumbering() {
        let merged = merge(&[walk_forward(&[1, 2], 6), walk_forward(&[1, 2, 3], 3)]).unwrap();
        let ResultSet::WalkForward(walk) = merged else {
            panic!("expected a walk-forward set");
        };
        assert_eq!(walk.total_windows, 5);
        let numbers: Vec<_> = walk.windows.iter().map(|w| w.window_number).collect();
        assert_eq!(numbers, vec![1, 2, 1, 2, 3]);
        let months: Vec<_> = walk.windows.iter().map(|w| w.test_period_months).collect();
        assert_eq!(months, vec![Some(6), Some(6), Some(3), Some(3), Some(3)]);
        assert_eq!(walk.windows[4].test_results[0].test_period_months, Some(3));
        assert_eq!(walk.test_period_months, Some(6));
        assert!(walk.portfolio_summary.is_none());
    }

    #[test]
    fn merging_does_not_modify_the_inputs() {
        let inputs = vec![normal(&[0.1], 1), normal(&[0.2], 1)];
        let snapshot = inputs.clone();
        merge(&inputs).unwrap();
        assert_eq!(inputs, snapshot);
    }
}
