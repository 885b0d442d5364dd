//! Bucketing of raw filing entries into per-account-year stores.

use crate::amount::parse_amount;
use crate::span::{SpanThresholds, classify_with};
use crate::types::{ConsolidationBasis, Constraint, FilingEntry, StatementKind, quarter_of};
use chrono::Datelike;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Snapshot values per quarter for one account-year.
pub type QuarterSnapshots = BTreeMap<u8, Decimal>;

type Years<T> = BTreeMap<i32, T>;
type Accounts<T> = BTreeMap<String, T>;
type ByBasis<T> = BTreeMap<ConsolidationBasis, T>;

/// Accumulates filing entries into the stores the solver and normalizer
/// consume.
///
/// Balance entries become point snapshots keyed by (basis, account, year,
/// quarter), last write winning. Flow entries become interval constraints;
/// cumulative ones additionally compete for the account-year's tracked
/// annual year-to-date figure. Ingestion is commutative across retrieval
/// units, so batches may be merged in any completion order.
///
/// An aggregator is created fresh per reconciliation run and owns its
/// stores exclusively.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    thresholds: SpanThresholds,
    pub(crate) snapshots: ByBasis<Accounts<Years<QuarterSnapshots>>>,
    pub(crate) constraints: ByBasis<Accounts<Years<Vec<Constraint>>>>,
    pub(crate) annual_ytd: ByBasis<Accounts<Years<(u8, Decimal)>>>,
}

impl ReportAggregator {
    /// New aggregator with the default span thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// New aggregator with custom span thresholds.
    pub fn with_thresholds(thresholds: SpanThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// Ingest one filing entry.
    pub fn ingest(&mut self, entry: &FilingEntry) {
        let amount = parse_amount(&entry.amount);
        if amount.is_zero() {
            // Zero carries no information: it is how malformed amounts
            // surface, and upstream pads missing figures with it.
            return;
        }

        let year = entry.end.year();
        match entry.statement {
            StatementKind::Balance => {
                self.snapshots
                    .entry(entry.basis)
                    .or_default()
                    .entry(entry.account.clone())
                    .or_default()
                    .entry(year)
                    .or_default()
                    .insert(quarter_of(entry.end), amount);
            }
            StatementKind::Flow => {
                let span = classify_with(entry.start, entry.end, &self.thresholds);
                if span.ambiguous {
                    debug!(
                        "span duration for '{}' ending {} sits exactly on a threshold",
                        entry.account, entry.end
                    );
                }
                self.constraints
                    .entry(entry.basis)
                    .or_default()
                    .entry(entry.account.clone())
                    .or_default()
                    .entry(year)
                    .or_default()
                    .push(Constraint {
                        quarters: span.quarters,
                        amount,
                        cumulative: span.cumulative,
                    });

                if span.cumulative
                    && let Some(q_max) = span.quarters.max()
                {
                    self.track_annual(entry.basis, &entry.account, year, q_max, amount);
                }
            }
        }
    }

    /// Ingest every entry of one retrieval unit.
    pub fn ingest_batch(&mut self, entries: &[FilingEntry]) {
        for entry in entries {
            self.ingest(entry);
        }
    }

    /// Keep the cumulative figure reaching the highest quarter as the
    /// annual total candidate. On equal reach the later arrival wins.
    fn track_annual(
        &mut self,
        basis: ConsolidationBasis,
        account: &str,
        year: i32,
        q_max: u8,
        amount: Decimal,
    ) {
        let slot = self
            .annual_ytd
            .entry(basis)
            .or_default()
            .entry(account.to_string())
            .or_default()
            .entry(year);
        match slot {
            Entry::Vacant(vacant) => {
                vacant.insert((q_max, amount));
            }
            Entry::Occupied(mut occupied) => {
                if q_max >= occupied.get().0 {
                    occupied.insert((q_max, amount));
                }
            }
        }
    }

    /// Tracked annual year-to-date figure for an account-year, if any.
    pub fn annual_ytd(
        &self,
        basis: ConsolidationBasis,
        account: &str,
        year: i32,
    ) -> Option<Decimal> {
        self.annual_ytd
            .get(&basis)
            .and_then(|accounts| accounts.get(account))
            .and_then(|years| years.get(&year))
            .map(|(_, amount)| *amount)
    }
}
