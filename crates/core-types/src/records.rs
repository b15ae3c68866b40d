use crate::enums::{GroupingParam, PeriodType};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// Group label used when a histogram is not sub-grouped.
pub const ALL_GROUP: &str = "All";

/// Sentinel label for a grouping field the source record did not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// One parameter combination's backtest outcome, as emitted by the optimizer.
///
/// Every field the analytics pipeline reads is optional; fields this crate does not
/// model are kept in `extra` so a record survives a read/write cycle intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_number: Option<u64>,
    /// Compound annual growth rate as a fraction (0.12 == 12%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cagr: Option<f64>,
    /// Cumulative return in percent, the fallback source for `cagr`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_return_pct: Option<f64>,
    #[serde(default)]
    pub max_drawdown: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_tickers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebalance_period: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub momentum_lookback_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_negative_momentum: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_value: Option<f64>,
    /// Nominal test-period length, stamped on by the merge annotation pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_period_months: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A grouping field value that may be absent on the source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Value(i64),
    NotAvailable,
}

impl FieldValue {
    pub fn as_option(&self) -> Option<i64> {
        match self {
            FieldValue::Value(v) => Some(*v),
            FieldValue::NotAvailable => None,
        }
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(FieldValue::NotAvailable, FieldValue::Value)
    }
}

impl From<Option<u32>> for FieldValue {
    fn from(value: Option<u32>) -> Self {
        value.map_or(FieldValue::NotAvailable, |v| FieldValue::Value(i64::from(v)))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Value(v) => write!(f, "{}", v),
            FieldValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Value(v) => serializer.serialize_i64(*v),
            FieldValue::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// The flat, normalized unit the histogram binner consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsRecord {
    /// CAGR in percentage points (12.5 == 12.5%).
    pub cagr_pct: f64,
    pub n_tickers: FieldValue,
    pub rebalance_period: FieldValue,
    pub momentum_lookback_days: FieldValue,
    pub test_period_months: FieldValue,
    pub score: f64,
    /// The selection this record was extracted under.
    pub source: PeriodType,
}

impl GroupingParam {
    /// Reads the grouping field from a record; `None` when no grouping is requested.
    pub fn field(self, record: &AnalyticsRecord) -> Option<FieldValue> {
        match self {
            GroupingParam::None => None,
            GroupingParam::NTickers => Some(record.n_tickers),
            GroupingParam::RebalancePeriod => Some(record.rebalance_period),
            GroupingParam::MomentumLookbackDays => Some(record.momentum_lookback_days),
            GroupingParam::TestPeriodMonths => Some(record.test_period_months),
        }
    }

    /// The histogram group label of a record under this grouping.
    pub fn group_key(self, record: &AnalyticsRecord) -> String {
        self.field(record)
            .map_or_else(|| ALL_GROUP.to_string(), |value| value.to_string())
    }
}

/// Orders group labels numerically where possible, then lexically, with `"N/A"` last.
pub fn compare_group_keys(a: &str, b: &str) -> Ordering {
    let rank = |key: &str| -> (u8, Option<f64>) {
        if key == NOT_AVAILABLE {
            (2, None)
        } else {
            match key.parse::<f64>() {
                Ok(n) if n.is_finite() => (0, Some(n)),
                _ => (1, None),
            }
        }
    };
    let (rank_a, num_a) = rank(a);
    let (rank_b, num_b) = rank(b);
    rank_a
        .cmp(&rank_b)
        .then_with(|| match (num_a, num_b) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}
