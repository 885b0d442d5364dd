//! Retrieval and caching of DART filings for the quartile engine.
//!
//! This crate owns everything with a side effect: the OpenDART HTTP client,
//! the corporate-identifier directory with its once-per-day SQLite cache,
//! the bounded-concurrency grid fetch with its daily in-memory cache, and
//! the service wrapper that feeds fetched filings through the pure
//! reconciliation engine in `quartile-core`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dart;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod service;

pub use dart::DartClient;
pub use directory::{CorpDirectory, CorpInfo};
pub use error::{DataError, Result};
pub use fetch::{DailyCache, FetchConfig, fetch_grid};
pub use service::{StructuredFinancialsService, StructuredReport};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
