//! CAGR reconciliation.
//!
//! Optimizer output does not always carry an annualized growth rate. When it is
//! missing, it is derived from the cumulative return and the length of the period
//! the return was earned over.

use crate::math::finite_or_zero;
use core_types::{PortfolioState, TrialRecord};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const MONTHS_PER_YEAR: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// The CAGR of a trial as a fraction.
///
/// A reported `cagr` wins. Otherwise `total_return_pct` is annualized over
/// `period_months`. With neither usable the result is `0.0`.
pub fn derive_cagr(record: &TrialRecord, period_months: Option<f64>) -> f64 {
    if let Some(cagr) = record.cagr {
        return finite_or_zero(cagr);
    }
    match (record.total_return_pct, period_months) {
        (Some(total_return_pct), Some(months)) => {
            annualize(total_return_pct / 100.0, months / MONTHS_PER_YEAR)
        }
        _ => 0.0,
    }
}

/// The CAGR of a portfolio simulation, annualized over elapsed calendar days.
///
/// Simulations have exact dates, so the year length is 365.25 days rather than
/// the nominal month count used for trials.
pub fn derive_simulation_cagr(state: &PortfolioState) -> f64 {
    let (Some(start), Some(end)) = (state.sim_start_date, state.sim_end_date) else {
        return 0.0;
    };
    let days = (end - start).num_days();
    if days <= 0 {
        return 0.0;
    }
    simulation_total_return(state)
        .map_or(0.0, |total_return| annualize(total_return, days as f64 / DAYS_PER_YEAR))
}

/// Fractional total return of a simulation: the reported percentage, else the
/// ratio of final to initial capital.
pub fn simulation_total_return(state: &PortfolioState) -> Option<f64> {
    if let Some(pct) = state.total_return_pct {
        return Some(pct / 100.0);
    }
    let initial = state.initial_capital?;
    let final_capital = state.final_capital?;
    let ratio = final_capital.checked_div(initial)?;
    (ratio - Decimal::ONE).to_f64()
}

/// `(1 + total_return)^(1 / years) - 1`, or `0.0` when that is undefined.
pub fn annualize(total_return: f64, years: f64) -> f64 {
    let growth = 1.0 + total_return;
    if !years.is_finite() || years <= 0.0 || growth < 0.0 {
        return 0.0;
    }
    finite_or_zero(growth.powf(1.0 / years) - 1.0)
}
