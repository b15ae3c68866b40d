//! Flattens the three result-set shapes into a single stream of `AnalyticsRecord`s.

use crate::cagr::{derive_cagr, derive_simulation_cagr};
use crate::math::round_dp;
use configuration::AnalysisSettings;
use core_types::{
    AnalyticsRecord, NormalResults, PeriodType, RecordType, ResultSet, TrainTestResults,
    TrialRecord, WalkForwardResults, Window,
};
use rayon::prelude::*;

/// Decimal places kept on `cagr_pct`, enough to absorb `0.29 * 100` style artefacts.
const CAGR_PCT_PRECISION: i32 = 10;

/// Which periods, and which record population, an extraction pass reads.
///
/// Periods are kept in canonical order without duplicates, so the output of a
/// multi-period selection does not depend on how the periods were listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    periods: Vec<PeriodType>,
    record_type: RecordType,
}

impl Selection {
    pub fn new(periods: impl IntoIterator<Item = PeriodType>, record_type: RecordType) -> Self {
        let mut periods: Vec<PeriodType> = periods.into_iter().collect();
        periods.sort();
        periods.dedup();
        Self { periods, record_type }
    }

    pub fn single(period: PeriodType, record_type: RecordType) -> Self {
        Self::new([period], record_type)
    }

    pub fn periods(&self) -> &[PeriodType] {
        &self.periods
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn includes(&self, period: PeriodType) -> bool {
        self.periods.contains(&period)
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

impl From<&AnalysisSettings> for Selection {
    fn from(settings: &AnalysisSettings) -> Self {
        Self::new(settings.periods.iter().copied(), settings.record_type)
    }
}

/// Extracts the selected records from a result set.
///
/// Never fails: selections that do not apply to the set's shape contribute nothing
/// and missing optional fields degrade to sentinels.
pub fn normalize(set: &ResultSet, selection: &Selection) -> Vec<AnalyticsRecord> {
    let records = match set {
        ResultSet::Normal(normal) => normalize_normal(normal, selection),
        ResultSet::TrainTest(split) => normalize_train_test(split, selection),
        ResultSet::WalkForward(walk) => normalize_walk_forward(walk, selection),
    };
    tracing::debug!(
        shape = %set.shape(),
        periods = ?selection.periods(),
        records = records.len(),
        "Normalized result set."
    );
    records
}

/// Where a population's scores come from.
#[derive(Clone, Copy)]
enum Scores<'a> {
    /// An array index-aligned with the trials.
    Parallel(&'a [f64]),
    /// Each trial's own `score` field.
    Embedded,
    Zero,
}

/// The trials of one period together with how to score and annualize them.
struct Extraction<'a> {
    trials: &'a [TrialRecord],
    scores: Scores<'a>,
    source: PeriodType,
    /// Length of the period the trials' returns were earned over, unless a test-side
    /// trial carries its own `test_period_months`.
    basis_months: Option<u32>,
    /// `test_period_months` attached to trials that carry no annotation of their own.
    test_period_months: Option<u32>,
}

impl Extraction<'_> {
    fn records(&self) -> impl Iterator<Item = AnalyticsRecord> + '_ {
        let basis = self.basis_months.map(f64::from);
        // Train trials carry the test length too, which says nothing about their own period.
        let own_length = matches!(self.source, PeriodType::Test | PeriodType::Simulation);
        self.trials.iter().enumerate().map(move |(index, trial)| {
            let months = match trial.test_period_months {
                Some(months) if own_length => Some(f64::from(months)),
                _ => basis,
            };
            let score = match self.scores {
                Scores::Parallel(scores) => scores.get(index).copied().unwrap_or(0.0),
                Scores::Embedded => trial.score.unwrap_or(0.0),
                Scores::Zero => 0.0,
            };
            AnalyticsRecord {
                cagr_pct: to_cagr_pct(derive_cagr(trial, months)),
                n_tickers: trial.n_tickers.into(),
                rebalance_period: trial.rebalance_period.into(),
                momentum_lookback_days: trial.momentum_lookback_days.into(),
                test_period_months: trial.test_period_months.or(self.test_period_months).into(),
                score,
                source: self.source,
            }
        })
    }
}

/// Picks the `all` arrays when requested and present, else the `top` arrays.
fn population<'a>(
    record_type: RecordType,
    top: &'a [TrialRecord],
    all: Option<&'a Vec<TrialRecord>>,
    scores: &'a [f64],
    all_scores: Option<&'a Vec<f64>>,
) -> (&'a [TrialRecord], Scores<'a>) {
    match (record_type, all) {
        (RecordType::All, Some(all)) => (
            all.as_slice(),
            all_scores.map_or(Scores::Zero, |s| Scores::Parallel(s.as_slice())),
        ),
        _ => (top, Scores::Parallel(scores)),
    }
}

fn normalize_normal(set: &NormalResults, selection: &Selection) -> Vec<AnalyticsRecord> {
    if !selection.includes(PeriodType::Test) {
        return Vec::new();
    }
    // Plain runs keep no separate full history: `top` and `all` read the same list.
    Extraction {
        trials: &set.results,
        scores: Scores::Embedded,
        source: PeriodType::Test,
        basis_months: set.test_period_months,
        test_period_months: set.test_period_months,
    }
    .records()
    .collect()
}

fn normalize_train_test(set: &TrainTestResults, selection: &Selection) -> Vec<AnalyticsRecord> {
    let test_span = set.test_period.and_then(|p| p.months());
    let test_basis = set.test_period_months.or(test_span);
    let attached = test_span.or(set.test_period_months);

    let mut records = Vec::new();
    for &period in selection.periods() {
        let (trials, scores, basis_months) = match period {
            PeriodType::Train => {
                let (trials, scores) = population(
                    selection.record_type(),
                    &set.train_results,
                    set.all_train_results.as_ref(),
                    &set.scores,
                    set.all_scores.as_ref(),
                );
                (trials, scores, set.train_period.and_then(|p| p.months()))
            }
            PeriodType::Test => {
                let (trials, scores) = population(
                    selection.record_type(),
                    &set.test_results,
                    set.all_test_results.as_ref(),
                    &set.scores,
                    set.all_scores.as_ref(),
                );
                (trials, scores, test_basis)
            }
            _ => continue,
        };
        records.extend(
            Extraction { trials, scores, source: period, basis_months, test_period_months: attached }
                .records(),
        );
    }
    records
}

fn normalize_walk_forward(set: &WalkForwardResults, selection: &Selection) -> Vec<AnalyticsRecord> {
    // Windows are independent; the indexed collect keeps window order.
    set.windows
        .par_iter()
        .flat_map_iter(|window| normalize_window(window, set, selection))
        .collect()
}

fn normalize_window(
    window: &Window,
    set: &WalkForwardResults,
    selection: &Selection,
) -> Vec<AnalyticsRecord> {
    let test_span = window.window.and_then(|b| b.test_period().months());
    let train_basis = set
        .train_period_months
        .or_else(|| window.window.and_then(|b| b.train_period().months()));
    let test_basis = window
        .test_period_months
        .or(set.test_period_months)
        .or(test_span);
    let attached = window.test_period_months.or(test_span).or(set.test_period_months);

    let mut records = Vec::new();
    for &period in selection.periods() {
        let (trials, scores, basis_months) = match period {
            PeriodType::Train => {
                let (trials, scores) = population(
                    selection.record_type(),
                    &window.train_results,
                    window.all_train_results.as_ref(),
                    &window.scores,
                    window.all_scores.as_ref(),
                );
                (trials, scores, train_basis)
            }
            PeriodType::Simulation => {
                let (trials, scores) = population(
                    selection.record_type(),
                    &window.test_results,
                    window.all_test_results.as_ref(),
                    &window.scores,
                    window.all_scores.as_ref(),
                );
                (trials, scores, test_basis)
            }
            PeriodType::AllSimulations | PeriodType::BetterThanWinner => {
                records.extend(simulation_record(window, period, attached));
                continue;
            }
            PeriodType::Test => continue,
        };
        records.extend(
            Extraction { trials, scores, source: period, basis_months, test_period_months: attached }
                .records(),
        );
    }
    records
}

/// The record of a window's realized portfolio simulation, if it ran.
///
/// `BetterThanWinner` keeps only profitable simulations.
fn simulation_record(
    window: &Window,
    source: PeriodType,
    test_period_months: Option<u32>,
) -> Option<AnalyticsRecord> {
    let state = window.portfolio_state.as_ref()?;
    if let Some(error) = &state.error {
        tracing::warn!(window = window.window_number, %error, "Skipping failed portfolio simulation.");
        return None;
    }
    let cagr = derive_simulation_cagr(state);
    if source == PeriodType::BetterThanWinner && cagr <= 0.0 {
        return None;
    }
    let params = state.best_params.as_ref();
    Some(AnalyticsRecord {
        cagr_pct: to_cagr_pct(cagr),
        n_tickers: params.and_then(|p| p.n_tickers).into(),
        rebalance_period: params.and_then(|p| p.rebalance_period).into(),
        momentum_lookback_days: params.and_then(|p| p.momentum_lookback_days).into(),
        test_period_months: test_period_months.into(),
        score: 0.0,
        source,
    })
}

fn to_cagr_pct(cagr: f64) -> f64 {
    round_dp(cagr * 100.0, CAGR_PCT_PRECISION)
}
