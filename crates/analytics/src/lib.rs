//! # Optiscope Analytics Engine
//!
//! Turns optimizer result sets into CAGR distribution analytics: a frequency
//! histogram and a reverse cumulative distribution ("percentage of trials achieving
//! at least X"), optionally grouped by a trial parameter.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** This is a pure logic crate. It performs no I/O and depends only
//!   on `core-types`, `configuration` and `merger`.
//! - **Stateless Calculation:** Every stage is a function over immutable input that
//!   produces new output: merge → normalize → bin → reverse CDF.
//! - **Always finite:** Missing fields degrade to documented sentinels and zero
//!   denominators yield `0`, so callers never see `NaN` or an error for odd input.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Runs the whole pipeline from configured settings.
//! - `normalize` / `Selection`: Flattens a result set into `AnalyticsRecord`s.
//! - `derive_cagr` / `derive_simulation_cagr`: Reconcile CAGR from cumulative returns.
//! - `bin_records` / `Histogram` / `BinSize`: Fixed-width CAGR binning.
//! - `reverse_cdf` / `CdfPoint`: The "at least X" curve per group.
//! - `AnalyticsReport`: The structured output handed to renderers.

// Declare the modules that constitute this crate.
pub mod cagr;
pub mod cdf;
pub mod engine;
pub mod error;
pub mod histogram;
mod math;
pub mod normalizer;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use cagr::{annualize, derive_cagr, derive_simulation_cagr, simulation_total_return};
pub use cdf::{CdfPoint, reverse_cdf};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use histogram::{Bin, BinSize, DENSE_BIN_LIMIT, Histogram, bin_records};
pub use normalizer::{Selection, normalize};
pub use report::AnalyticsReport;
