//! Core domain types shared across the engine.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Accounting scope a filing's figures reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsolidationBasis {
    /// Parent plus subsidiaries (DART code `CFS`).
    Consolidated,
    /// Parent only (DART code `OFS`).
    Standalone,
}

/// Whether an account carries point-in-time or period-flow values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Balance-sheet account: a snapshot at the report date.
    Balance,
    /// Income-statement account: a flow summed over a reporting interval.
    Flow,
}

/// One raw filing entry as received from the upstream provider.
///
/// The amount stays as text; parsing is deferred to [`crate::parse_amount`]
/// so a malformed entry never aborts the batch it arrived in.
#[derive(Debug, Clone)]
pub struct FilingEntry {
    /// Consolidation basis of the statement the entry belongs to.
    pub basis: ConsolidationBasis,
    /// Statement kind the entry belongs to.
    pub statement: StatementKind,
    /// Account name, e.g. "자산총계".
    pub account: String,
    /// Raw amount text, possibly with thousands separators or parentheses.
    pub amount: String,
    /// Interval end for flow entries; the report date for balance entries.
    pub end: NaiveDate,
    /// Interval start for flow entries; absent for point-in-time figures.
    pub start: Option<NaiveDate>,
}

/// Fiscal quarter (1..=4) a calendar date falls in.
pub fn quarter_of(date: NaiveDate) -> u8 {
    (date.month0() / 3 + 1) as u8
}

/// Set of fiscal quarters a filing's amount spans.
///
/// Bitmask over quarters 1..=4; stored constraints always hold a non-empty
/// set that never reaches outside the reporting year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QuarterSet(u8);

impl QuarterSet {
    const MASK: u8 = 0b1_1110;

    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Set containing a single quarter.
    pub fn single(quarter: u8) -> Self {
        let mut set = Self::EMPTY;
        set.insert(quarter);
        set
    }

    /// Set covering `lo..=hi`.
    pub fn range(lo: u8, hi: u8) -> Self {
        let mut set = Self::EMPTY;
        for q in lo..=hi {
            set.insert(q);
        }
        set
    }

    /// Add a quarter to the set. Quarters outside 1..=4 are ignored.
    pub fn insert(&mut self, quarter: u8) {
        if (1..=4).contains(&quarter) {
            self.0 |= 1 << quarter;
        }
    }

    /// Whether the set contains `quarter`.
    pub const fn contains(self, quarter: u8) -> bool {
        quarter >= 1 && quarter <= 4 && self.0 & (1 << quarter) != 0
    }

    /// Number of quarters in the set.
    pub const fn len(self) -> usize {
        (self.0 & Self::MASK).count_ones() as usize
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 & Self::MASK == 0
    }

    /// Highest quarter in the set, if any.
    pub fn max(self) -> Option<u8> {
        (1..=4).rev().find(|&q| self.contains(q))
    }

    /// Quarters in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=4).filter(move |&q| self.contains(q))
    }
}

/// One flow filing's contribution to an account-year's unknowns.
///
/// Semantically the equation `sum of per-quarter values over quarters ==
/// amount`. A cumulative constraint is a year-to-date running total ending
/// at the maximum quarter of its set, so only that quarter may be treated
/// as newly resolved by it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    /// Quarters the amount spans.
    pub quarters: QuarterSet,
    /// Exact filed amount.
    pub amount: Decimal,
    /// Whether the amount is a year-to-date running total.
    pub cumulative: bool,
}

/// Per-quarter values recovered for one account-year.
///
/// Serializes as `{"1": .., "2": .., "all": ..}` with numeric quarter keys
/// ascending and `"all"` always last. Quarters the constraint system left
/// underdetermined are simply absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolvedYear {
    /// Standalone value per solved quarter.
    pub quarters: BTreeMap<u8, f64>,
    /// Annual total, when derivable.
    pub annual: Option<f64>,
}

impl SolvedYear {
    /// Whether nothing was solved for this year.
    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty() && self.annual.is_none()
    }
}

impl Serialize for SolvedYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.quarters.len() + usize::from(self.annual.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (quarter, value) in &self.quarters {
            map.serialize_entry(&quarter.to_string(), value)?;
        }
        if let Some(annual) = self.annual {
            map.serialize_entry("all", &annual)?;
        }
        map.end()
    }
}
