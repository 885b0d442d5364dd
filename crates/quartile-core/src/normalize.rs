//! Conversion of solved and snapshot stores into the final nested view.

use crate::aggregate::ReportAggregator;
use crate::solver::solve_year;
use crate::types::{ConsolidationBasis, SolvedYear, StatementKind};
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

/// Account name to per-fiscal-year values.
pub type AccountSeries = BTreeMap<String, BTreeMap<i32, SolvedYear>>;

/// The query-friendly view: consolidation basis, then statement kind, then
/// account, then fiscal year, then quarter label. Every level is a
/// `BTreeMap`, so serialization order is deterministic; `serde_json`
/// renders the integer year keys as strings.
pub type StructuredFinancials = BTreeMap<ConsolidationBasis, BTreeMap<StatementKind, AccountSeries>>;

/// Build the final structure from a populated aggregator.
///
/// Balance account-years come straight from their snapshots and never carry
/// an `"all"` entry. Flow account-years run the solver with the tracked
/// annual year-to-date figure; years where nothing could be solved are
/// omitted entirely.
pub fn normalize(aggregator: &ReportAggregator) -> StructuredFinancials {
    let mut out = StructuredFinancials::new();

    for (basis, accounts) in &aggregator.snapshots {
        for (account, years) in accounts {
            for (year, snapshots) in years {
                if snapshots.is_empty() {
                    continue;
                }
                let solved = SolvedYear {
                    quarters: snapshots
                        .iter()
                        .map(|(q, v)| (*q, v.to_f64().unwrap_or_default()))
                        .collect(),
                    annual: None,
                };
                out.entry(*basis)
                    .or_default()
                    .entry(StatementKind::Balance)
                    .or_default()
                    .entry(account.clone())
                    .or_default()
                    .insert(*year, solved);
            }
        }
    }

    for (basis, accounts) in &aggregator.constraints {
        for (account, years) in accounts {
            for (year, constraints) in years {
                let annual = aggregator.annual_ytd(*basis, account, *year);
                let solved = solve_year(constraints, annual);
                if solved.is_empty() {
                    continue;
                }
                out.entry(*basis)
                    .or_default()
                    .entry(StatementKind::Flow)
                    .or_default()
                    .entry(account.clone())
                    .or_default()
                    .insert(*year, solved);
            }
        }
    }

    out
}
