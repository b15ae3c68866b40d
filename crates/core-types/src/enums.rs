use serde::{Deserialize, Serialize};
use std::fmt;

/// The slice of a result set an extraction pass reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "clap", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// Out-of-sample trials of a normal or train/test run.
    Test,
    /// In-sample trials of a train/test run or of each walk-forward window.
    Train,
    /// Out-of-sample trials of each walk-forward window.
    Simulation,
    /// Every successful per-window portfolio simulation.
    AllSimulations,
    /// Portfolio simulations with a strictly positive CAGR.
    BetterThanWinner,
}

impl PeriodType {
    /// Every period, in the order multi-period extractions are performed.
    pub const ALL: [PeriodType; 5] = [
        PeriodType::Test,
        PeriodType::Train,
        PeriodType::Simulation,
        PeriodType::AllSimulations,
        PeriodType::BetterThanWinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Test => "test",
            PeriodType::Train => "train",
            PeriodType::Simulation => "simulation",
            PeriodType::AllSimulations => "all_simulations",
            PeriodType::BetterThanWinner => "better_than_winner",
        }
    }

    /// True for selections derived from portfolio simulations rather than trial arrays.
    pub fn is_portfolio(&self) -> bool {
        matches!(self, PeriodType::AllSimulations | PeriodType::BetterThanWinner)
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which trial population to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// The winning trials the optimizer kept.
    #[default]
    Top,
    /// The full history arrays, falling back to `Top` when a set does not carry them.
    All,
}

/// The field a histogram is sub-grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "clap", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum GroupingParam {
    #[default]
    None,
    NTickers,
    RebalancePeriod,
    MomentumLookbackDays,
    TestPeriodMonths,
}

impl GroupingParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingParam::None => "none",
            GroupingParam::NTickers => "n_tickers",
            GroupingParam::RebalancePeriod => "rebalance_period",
            GroupingParam::MomentumLookbackDays => "momentum_lookback_days",
            GroupingParam::TestPeriodMonths => "test_period_months",
        }
    }
}

impl fmt::Display for GroupingParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The variant tag of a `ResultSet`, used wherever shapes are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultShape {
    Normal,
    TrainTest,
    WalkForward,
}

impl ResultShape {
    /// The `(walk_forward_mode, train_test_mode)` marker pair this shape is stored with.
    pub fn markers(&self) -> (bool, bool) {
        match self {
            ResultShape::Normal => (false, false),
            ResultShape::TrainTest => (false, true),
            ResultShape::WalkForward => (true, false),
        }
    }
}

impl fmt::Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultShape::Normal => "normal",
            ResultShape::TrainTest => "train/test",
            ResultShape::WalkForward => "walk-forward",
        };
        f.write_str(name)
    }
}
