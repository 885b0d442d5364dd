//! Reconciliation engine for quarterly financial disclosures.
//!
//! Korean companies file balance figures as point-in-time snapshots and flow
//! figures as amounts over irregular date ranges, many of them year-to-date
//! running totals. This crate classifies each filing's reporting interval
//! into the fiscal quarters it covers, then solves the resulting system of
//! overlapping cumulative constraints to recover the standalone value of
//! each quarter and the annual total.
//!
//! Everything here is synchronous, pure computation over already-fetched
//! filings. Retrieval and caching live in `quartile-data`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod amount;
pub mod normalize;
pub mod solver;
pub mod span;
pub mod types;

pub use aggregate::ReportAggregator;
pub use amount::parse_amount;
pub use normalize::{StructuredFinancials, normalize};
pub use solver::solve_year;
pub use span::{SpanClass, SpanThresholds, classify, classify_with};
pub use types::{
    ConsolidationBasis, Constraint, FilingEntry, QuarterSet, SolvedYear, StatementKind, quarter_of,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
