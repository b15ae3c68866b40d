use analytics::{annualize, derive_cagr, derive_simulation_cagr};
use chrono::NaiveDate;
use core_types::{PortfolioState, TrialRecord, WalkForwardResults, Window};
use itertools::Itertools;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const DAYS_PER_YEAR: f64 = 365.25;

/// Whole-run view of a walk-forward optimization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkForwardSummary {
    pub total_windows: usize,
    pub train_period_months: Option<u32>,
    pub test_period_months: Option<u32>,
    pub step_months: Option<u32>,
    pub aggregated: AggregatedPerformance,
    /// `None` when no window produced a successful simulation.
    pub portfolio: Option<PortfolioChain>,
    pub simulations: SimulationCounts,
    pub parameter_frequency: Vec<ParameterFrequency>,
}

/// Out-of-sample performance of each window's top-ranked trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedPerformance {
    /// Windows that had at least one test result.
    pub windows: usize,
    /// Geometric mean of the per-window test CAGRs, as a fraction.
    pub test_cagr: f64,
    /// Arithmetic mean of the per-window test max drawdowns, as a fraction.
    pub avg_test_max_drawdown: f64,
}

/// The capital chain of the per-window portfolio simulations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioChain {
    pub initial_capital: Decimal,
    pub final_capital: Decimal,
    pub total_return_pct: f64,
    /// Annualized over `start_date..end_date` in 365.25-day years, as a fraction.
    pub cagr: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimulationCounts {
    pub successful: usize,
    pub failed: usize,
    pub profitable: usize,
}

/// The parameters that identify a winning combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParameterKey {
    pub strategy: Option<String>,
    pub n_tickers: Option<i64>,
    pub rebalance_period: Option<i64>,
    pub momentum_lookback_days: Option<i64>,
}

impl From<&TrialRecord> for ParameterKey {
    fn from(trial: &TrialRecord) -> Self {
        Self {
            strategy: trial.strategy.clone(),
            n_tickers: trial.n_tickers,
            rebalance_period: trial.rebalance_period,
            momentum_lookback_days: trial.momentum_lookback_days,
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_dash(value: Option<i64>) -> String {
            value.map_or_else(|| "-".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "{} | N:{} | Rebal:{} | Look:{}",
            self.strategy.as_deref().unwrap_or("-"),
            or_dash(self.n_tickers),
            or_dash(self.rebalance_period),
            or_dash(self.momentum_lookback_days),
        )
    }
}

/// How often a parameter combination won its window's training period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterFrequency {
    pub key: ParameterKey,
    pub count: usize,
    pub windows: Vec<u32>,
}

/// Summarizes a walk-forward run from its windows.
pub fn summarize(results: &WalkForwardResults) -> WalkForwardSummary {
    let summary = WalkForwardSummary {
        total_windows: results.windows.len(),
        train_period_months: results.train_period_months,
        test_period_months: results.test_period_months,
        step_months: results.step_months,
        aggregated: aggregate_test_performance(results),
        portfolio: portfolio_chain(&results.windows),
        simulations: count_simulations(&results.windows),
        parameter_frequency: parameter_frequency(&results.windows),
    };
    tracing::debug!(
        windows = summary.total_windows,
        successful = summary.simulations.successful,
        "Summarized walk-forward run."
    );
    summary
}

fn aggregate_test_performance(results: &WalkForwardResults) -> AggregatedPerformance {
    let top_tests: Vec<(f64, f64)> = results
        .windows
        .iter()
        .filter_map(|window| {
            let top = window.test_results.first()?;
            let months = results
                .test_period_months
                .or_else(|| window.window.and_then(|b| b.test_period().months()))
                .map(f64::from);
            Some((derive_cagr(top, months), top.max_drawdown))
        })
        .collect();

    if top_tests.is_empty() {
        return AggregatedPerformance::default();
    }
    let n = top_tests.len() as f64;
    let growth: f64 = top_tests.iter().map(|(cagr, _)| 1.0 + cagr).product();
    AggregatedPerformance {
        windows: top_tests.len(),
        test_cagr: annualize(growth - 1.0, n),
        avg_test_max_drawdown: top_tests.iter().map(|(_, dd)| dd).sum::<f64>() / n,
    }
}

fn successful_states(windows: &[Window]) -> impl Iterator<Item = &PortfolioState> {
    windows
        .iter()
        .filter_map(|w| w.portfolio_state.as_ref())
        .filter(|state| state.is_success())
}

fn portfolio_chain(windows: &[Window]) -> Option<PortfolioChain> {
    let first = successful_states(windows).find(|s| s.initial_capital.is_some())?;
    let last = successful_states(windows)
        .filter(|s| s.final_capital.is_some())
        .last()?;
    let initial_capital = first.initial_capital?;
    let final_capital = last.final_capital?;

    let total_return = final_capital
        .checked_div(initial_capital)
        .and_then(|ratio| (ratio - Decimal::ONE).to_f64())
        .unwrap_or(0.0);

    let start_date = successful_states(windows).find_map(|s| s.sim_start_date);
    let end_date = successful_states(windows).filter_map(|s| s.sim_end_date).last();
    let cagr = match (start_date, end_date) {
        (Some(start), Some(end)) => {
            annualize(total_return, (end - start).num_days() as f64 / DAYS_PER_YEAR)
        }
        _ => 0.0,
    };

    Some(PortfolioChain {
        initial_capital,
        final_capital,
        total_return_pct: total_return * 100.0,
        cagr,
        start_date,
        end_date,
    })
}

fn count_simulations(windows: &[Window]) -> SimulationCounts {
    windows
        .iter()
        .filter_map(|w| w.portfolio_state.as_ref())
        .fold(SimulationCounts::default(), |mut counts, state| {
            if state.is_success() {
                counts.successful += 1;
                if derive_simulation_cagr(state) > 0.0 {
                    counts.profitable += 1;
                }
            } else {
                counts.failed += 1;
            }
            counts
        })
}

fn parameter_frequency(windows: &[Window]) -> Vec<ParameterFrequency> {
    let mut by_key: BTreeMap<ParameterKey, Vec<u32>> = BTreeMap::new();
    for window in windows {
        if let Some(top) = window.train_results.first() {
            by_key.entry(ParameterKey::from(top)).or_default().push(window.window_number);
        }
    }
    by_key
        .into_iter()
        .map(|(key, windows)| ParameterFrequency { count: windows.len(), key, windows })
        .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ResultSet;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    fn walk(windows: Value) -> WalkForwardResults {
        match ResultSet::from_value(json!({
            "walk_forward_mode": true,
            "train_period_months": 12,
            "test_period_months": 6,
            "step_months": 6,
            "windows": windows
        })) {
            Ok(ResultSet::WalkForward(walk)) => walk,
            other => panic!("expected a walk-forward set, got {other:?}"),
        }
    }

    fn sample() -> WalkForwardResults {
        walk(json!([
            {
                "window_number": 1,
                "train_results": [{ "strategy": "momentum", "n_tickers": 5, "rebalance_period": 3 }],
                "test_results": [{ "cagr": 0.21, "max_drawdown": 0.1 }],
                "portfolio_state": {
                    "sim_start_date": "2020-01-01", "sim_end_date": "2020-06-30",
                    "initial_capital": 10000, "final_capital": 11000, "total_return_pct": 10.0
                }
            },
            {
                "window_number": 2,
                "train_results": [{ "strategy": "momentum", "n_tickers": 8 }],
                "test_results": [{ "cagr": -0.01, "max_drawdown": 0.3 }],
                "portfolio_state": { "error": "no data", "capital_carried_forward": 11000 }
            },
            {
                "window_number": 3,
                "train_results": [{ "strategy": "momentum", "n_tickers": 5, "rebalance_period": 3 }],
                "test_results": [],
                "portfolio_state": {
                    "sim_start_date": "2021-01-01", "sim_end_date": "2024-01-01",
                    "initial_capital": 11000, "final_capital": 10450, "total_return_pct": -5.0
                }
            }
        ]))
    }

    #[test]
    fn aggregated_cagr_is_the_geometric_mean_of_top_tests() {
        let summary = summarize(&sample());
        assert_eq!(summary.aggregated.windows, 2);
        let expected = (1.21f64 * 0.99).sqrt() - 1.0;
        assert!((summary.aggregated.test_cagr - expected).abs() < 1e-12);
        assert!((summary.aggregated.avg_test_max_drawdown - 0.2).abs() < 1e-12);
    }

    #[test]
    fn no_tested_windows_aggregate_to_zero() {
        let summary = summarize(&walk(json!([{ "window_number": 1 }])));
        assert_eq!(summary.aggregated, AggregatedPerformance::default());
        assert!(summary.portfolio.is_none());
        assert!(summary.parameter_frequency.is_empty());
    }

    #[test]
    fn portfolio_chain_spans_successful_simulations() {
        let chain = summarize(&sample()).portfolio.unwrap();
        assert_eq!(chain.initial_capital, dec!(10000));
        assert_eq!(chain.final_capital, dec!(10450));
        assert!((chain.total_return_pct - 4.5).abs() < 1e-9);
        assert_eq!(chain.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(chain.end_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        // Exactly four 365.25-day years.
        assert!((chain.cagr - (1.045f64.powf(0.25) - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn simulations_are_counted_by_outcome() {
        let counts = summarize(&sample()).simulations;
        assert_eq!(counts, SimulationCounts { successful: 2, failed: 1, profitable: 1 });
    }

    #[test]
    fn winning_parameters_are_ranked_by_frequency() {
        let frequency = summarize(&sample()).parameter_frequency;
        assert_eq!(frequency.len(), 2);
        assert_eq!(frequency[0].count, 2);
        assert_eq!(frequency[0].windows, vec![1, 3]);
        assert_eq!(frequency[0].key.to_string(), "momentum | N:5 | Rebal:3 | Look:-");
        assert_eq!(frequency[1].key.n_tickers, Some(8));
    }

    #[test]
    fn summary_carries_run_geometry() {
        let summary = summarize(&sample());
        assert_eq!(summary.total_windows, 3);
        assert_eq!(summary.train_period_months, Some(12));
        assert_eq!(summary.test_period_months, Some(6));
        assert_eq!(summary.step_months, Some(6));
    }
}
