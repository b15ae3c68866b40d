use crate::enums::ResultShape;
use crate::error::CoreError;
use crate::records::TrialRecord;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const WALK_FORWARD_MARKER: &str = "walk_forward_mode";
const TRAIN_TEST_MARKER: &str = "train_test_mode";

/// Whole calendar months covered by the inclusive range `start..=end`.
///
/// Returns `None` for inverted ranges and for spans shorter than one month.
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    if end < start {
        return None;
    }
    let next = end.succ_opt()?;
    let mut months = (next.year() - start.year()) * 12 + next.month() as i32 - start.month() as i32;
    if next.day() < start.day() {
        months -= 1;
    }
    u32::try_from(months).ok().filter(|m| *m > 0)
}

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn months(&self) -> Option<u32> {
        months_spanned(self.start, self.end)
    }
}

/// A plain optimization run: one list of scored trials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalResults {
    #[serde(default)]
    pub results: Vec<TrialRecord>,
    #[serde(default)]
    pub total_tests: u64,
    #[serde(default)]
    pub completed_tests: u64,
    #[serde(default, alias = "test_months", skip_serializing_if = "Option::is_none")]
    pub test_period_months: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A train/test split run. `train_results[i]`, `test_results[i]` and `scores[i]`
/// describe the same trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainTestResults {
    #[serde(default)]
    pub train_results: Vec<TrialRecord>,
    #[serde(default)]
    pub test_results: Vec<TrialRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_train_results: Option<Vec<TrialRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_test_results: Option<Vec<TrialRecord>>,
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_scores: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_period: Option<Period>,
    #[serde(default)]
    pub total_tests: u64,
    #[serde(default)]
    pub completed_tests: u64,
    #[serde(default, alias = "test_months", skip_serializing_if = "Option::is_none")]
    pub test_period_months: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The four dates that delimit one walk-forward window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub test_start: NaiveDate,
    pub test_end: NaiveDate,
}

impl WindowBounds {
    pub fn train_period(&self) -> Period {
        Period { start: self.train_start, end: self.train_end }
    }

    pub fn test_period(&self) -> Period {
        Period { start: self.test_start, end: self.test_end }
    }
}

/// The realized, capital-continuous trading run over a window's simulation dates.
///
/// A failed simulation carries only `error` (and possibly the capital carried forward).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_end_date: Option<NaiveDate>,
    /// The winning parameter set the simulation traded with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_params: Option<TrialRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_capital: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_capital: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_return_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawdown_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_carried_forward: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PortfolioState {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Whole-run performance of the chained portfolio simulations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_capital: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_capital: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_return_pct: Option<f64>,
    /// Annualized growth in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cagr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One train-period/test-period pair of a rolling optimization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub window_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowBounds>,
    #[serde(default)]
    pub train_results: Vec<TrialRecord>,
    #[serde(default)]
    pub test_results: Vec<TrialRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_train_results: Option<Vec<TrialRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_test_results: Option<Vec<TrialRecord>>,
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_scores: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_state: Option<PortfolioState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_period_months: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A rolling walk-forward optimization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardResults {
    #[serde(default)]
    pub windows: Vec<Window>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_period_months: Option<u32>,
    #[serde(default, alias = "test_months", skip_serializing_if = "Option::is_none")]
    pub test_period_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_months: Option<u32>,
    #[serde(default)]
    pub total_windows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_summary: Option<PortfolioSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The output of one optimizer run. The variant is decided once, at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    Normal(NormalResults),
    TrainTest(TrainTestResults),
    WalkForward(WalkForwardResults),
}

impl Default for ResultSet {
    fn default() -> Self {
        ResultSet::Normal(NormalResults::default())
    }
}

impl ResultSet {
    /// Decides the variant of an already-parsed result document.
    ///
    /// A bare array is a normal run's trial list. A value with neither mode marker
    /// and no `results` array is an empty normal run.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Array(_) => {
                let results: Vec<TrialRecord> = serde_json::from_value(value)?;
                let count = results.len() as u64;
                Ok(ResultSet::Normal(NormalResults {
                    results,
                    total_tests: count,
                    completed_tests: count,
                    ..Default::default()
                }))
            }
            Value::Object(mut map) => {
                let walk_forward = take_marker(&mut map, WALK_FORWARD_MARKER);
                let train_test = take_marker(&mut map, TRAIN_TEST_MARKER);
                match (walk_forward, train_test) {
                    (true, true) => Err(CoreError::ConflictingModes),
                    (true, false) => Ok(ResultSet::WalkForward(serde_json::from_value(
                        Value::Object(map),
                    )?)),
                    (false, true) => Ok(ResultSet::TrainTest(serde_json::from_value(
                        Value::Object(map),
                    )?)),
                    (false, false) if map.get("results").is_some_and(Value::is_array) => Ok(
                        ResultSet::Normal(serde_json::from_value(Value::Object(map))?),
                    ),
                    (false, false) => {
                        tracing::debug!("Result document has no mode marker and no results; treating as empty.");
                        Ok(ResultSet::default())
                    }
                }
            }
            _ => {
                tracing::debug!("Result document is not an object or array; treating as empty.");
                Ok(ResultSet::default())
            }
        }
    }

    /// Renders the set back into its marker-flagged JSON shape.
    pub fn to_value(&self) -> Result<Value, CoreError> {
        let (mut value, marker) = match self {
            ResultSet::Normal(set) => (serde_json::to_value(set)?, None),
            ResultSet::TrainTest(set) => (serde_json::to_value(set)?, Some(TRAIN_TEST_MARKER)),
            ResultSet::WalkForward(set) => {
                (serde_json::to_value(set)?, Some(WALK_FORWARD_MARKER))
            }
        };
        if let (Some(marker), Value::Object(map)) = (marker, &mut value) {
            map.insert(marker.to_string(), Value::Bool(true));
        }
        Ok(value)
    }

    pub fn shape(&self) -> ResultShape {
        match self {
            ResultSet::Normal(_) => ResultShape::Normal,
            ResultSet::TrainTest(_) => ResultShape::TrainTest,
            ResultSet::WalkForward(_) => ResultShape::WalkForward,
        }
    }

    /// The set-level nominal test-period length, if the producer recorded one.
    pub fn test_period_months(&self) -> Option<u32> {
        match self {
            ResultSet::Normal(set) => set.test_period_months,
            ResultSet::TrainTest(set) => set.test_period_months,
            ResultSet::WalkForward(set) => set.test_period_months,
        }
    }

    /// Number of top-population trials the set carries (windows summed for walk-forward).
    pub fn trial_count(&self) -> usize {
        match self {
            ResultSet::Normal(set) => set.results.len(),
            ResultSet::TrainTest(set) => set.test_results.len(),
            ResultSet::WalkForward(set) => set.windows.iter().map(|w| w.test_results.len()).sum(),
        }
    }
}

fn take_marker(map: &mut Map<String, Value>, key: &str) -> bool {
    map.remove(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResultSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ResultSet::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case(date(2020, 1, 1), date(2020, 6, 30), Some(6))]
    #[test_case(date(2020, 1, 1), date(2020, 12, 31), Some(12))]
    #[test_case(date(2020, 1, 15), date(2020, 7, 14), Some(6))]
    #[test_case(date(2020, 1, 15), date(2020, 7, 13), Some(5))]
    #[test_case(date(2020, 1, 1), date(2020, 1, 20), None)]
    #[test_case(date(2020, 6, 1), date(2020, 1, 1), None)]
    fn months_spanned_counts_whole_calendar_months(
        start: NaiveDate,
        end: NaiveDate,
        expected: Option<u32>,
    ) {
        assert_eq!(months_spanned(start, end), expected);
    }

    #[test]
    fn markers_decide_the_variant() {
        let wf = ResultSet::from_value(json!({ "walk_forward_mode": true, "windows": [] })).unwrap();
        assert_eq!(wf.shape(), ResultShape::WalkForward);

        let tt = ResultSet::from_value(json!({
            "train_test_mode": true,
            "train_results": [{ "cagr": 0.1 }],
            "test_results": [{ "cagr": 0.05 }],
            "scores": [80.0],
            "train_period": { "start": "2020-01-01", "end": "2020-12-31" },
            "test_period": { "start": "2021-01-01", "end": "2021-06-30" },
            "total_tests": 10,
            "completed_tests": 10
        }))
        .unwrap();
        let ResultSet::TrainTest(set) = tt else {
            panic!("expected a train/test set");
        };
        assert_eq!(set.scores, vec![80.0]);
        assert_eq!(set.test_period.and_then(|p| p.months()), Some(6));
        assert!(!set.extra.contains_key("train_test_mode"));
    }

    #[test]
    fn both_markers_are_rejected() {
        let err = ResultSet::from_value(json!({
            "walk_forward_mode": true,
            "train_test_mode": true
        }))
        .unwrap_err();
        assert!(matches!(err, CoreError::ConflictingModes));
    }

    #[test]
    fn false_markers_fall_through_to_normal() {
        let set = ResultSet::from_value(json!({
            "walk_forward_mode": false,
            "results": [{ "cagr": 0.2 }, { "cagr": 0.3 }],
            "total_tests": 4,
            "completed_tests": 2
        }))
        .unwrap();
        assert_eq!(set.shape(), ResultShape::Normal);
        assert_eq!(set.trial_count(), 2);
    }

    #[test]
    fn bare_array_is_a_normal_trial_list() {
        let set = ResultSet::from_value(json!([{ "cagr": 0.1 }, { "cagr": 0.2 }, {}])).unwrap();
        let ResultSet::Normal(normal) = set else {
            panic!("expected a normal set");
        };
        assert_eq!(normal.results.len(), 3);
        assert_eq!(normal.total_tests, 3);
        assert_eq!(normal.completed_tests, 3);
    }

    #[test_case(json!({ "something": "else" }) ; "object without results")]
    #[test_case(json!(null) ; "null")]
    #[test_case(json!("text") ; "string")]
    fn unrecognised_documents_are_empty_normal_sets(value: Value) {
        let set = ResultSet::from_value(value).unwrap();
        assert_eq!(set, ResultSet::default());
    }

    #[test]
    fn test_months_is_accepted_as_an_alias() {
        let set = ResultSet::from_value(json!({ "results": [], "test_months": 6 })).unwrap();
        assert_eq!(set.test_period_months(), Some(6));
    }

    #[test]
    fn serialization_restores_the_marker() {
        let source = json!({
            "walk_forward_mode": true,
            "windows": [{
                "window_number": 1,
                "window": {
                    "train_start": "2020-01-01",
                    "train_end": "2020-12-31",
                    "test_start": "2021-01-01",
                    "test_end": "2021-06-30"
                },
                "train_results": [],
                "test_results": [],
                "scores": [],
                "portfolio_state": {
                    "sim_start_date": "2021-07-01",
                    "sim_end_date": "2021-08-01",
                    "initial_capital": 10000,
                    "final_capital": 10500.5,
                    "total_return_pct": 5.005
                }
            }],
            "train_period_months": 12,
            "test_period_months": 6,
            "step_months": 6,
            "total_windows": 1
        });
        let set = ResultSet::from_value(source).unwrap();
        let ResultSet::WalkForward(wf) = &set else {
            panic!("expected a walk-forward set");
        };
        let state = wf.windows[0].portfolio_state.as_ref().unwrap();
        assert_eq!(state.initial_capital, Some(dec!(10000)));
        assert!(state.is_success());

        let value = set.to_value().unwrap();
        assert_eq!(value["walk_forward_mode"], json!(true));
        assert!(value.get("train_test_mode").is_none());
        assert_eq!(ResultSet::from_value(value).unwrap(), set);
    }
}
