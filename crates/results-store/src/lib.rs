//! # Optiscope Results Store
//!
//! Read access to the optimization results the optimizer saves to disk.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All filesystem specifics live here. The rest of the
//!   application only sees `ResultSet`s.
//! - **Asynchronous:** Files are read with `tokio::fs`, so the CLI can load several
//!   result files concurrently.
//!
//! ## Public API
//!
//! - `resolve_results_dir`: Locates the results directory.
//! - `extract_payload`: Pulls the JSON document out of a saved report.
//! - `ResultsRepository`: Lists and loads saved result files.
//! - `StoreError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod payload;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{DEFAULT_RESULTS_DIR, RESULTS_DIR_ENV, resolve_results_dir};
pub use error::StoreError;
pub use payload::{JSON_MARKER, extract_payload};
pub use repository::ResultsRepository;
