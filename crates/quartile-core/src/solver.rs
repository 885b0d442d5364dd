//! Fixed-point solver recovering per-quarter values from overlapping
//! cumulative constraints.

use crate::types::{Constraint, SolvedYear};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

/// Solve one account-year's constraint system.
///
/// Constraints are grouped by span length and peeled longest-first: a
/// constraint yields a value only once exactly one quarter in its set is
/// still unknown, and a cumulative constraint only resolves the maximum
/// quarter of its set — a year-to-date total is append-only evidence, never
/// retroactively distributive over earlier quarters. The outer loop runs to
/// a fixed point; whatever remains underdetermined is left unsolved rather
/// than treated as an error.
///
/// `annual_ytd`, when supplied, is the cumulative filing reaching the
/// highest quarter of the year and is authoritative for `"all"` over any
/// computed sum. Arithmetic stays exact; values convert to `f64` only on
/// emission.
///
/// The result is independent of constraint ordering: the single-unknown
/// gate makes the solved set grow monotonically, so any firing order
/// reaches the same fixed point.
pub fn solve_year(constraints: &[Constraint], annual_ytd: Option<Decimal>) -> SolvedYear {
    let mut by_len: [Vec<&Constraint>; 4] = Default::default();
    for constraint in constraints {
        if constraint.quarters.is_empty() {
            continue;
        }
        by_len[constraint.quarters.len() - 1].push(constraint);
    }

    let mut solved: BTreeMap<u8, Decimal> = BTreeMap::new();
    let mut changed = true;
    while changed {
        changed = false;
        for len in (1..=4usize).rev() {
            for constraint in &by_len[len - 1] {
                let mut unknown = constraint
                    .quarters
                    .iter()
                    .filter(|q| !solved.contains_key(q));
                let (Some(quarter), None) = (unknown.next(), unknown.next()) else {
                    continue;
                };
                if constraint.cumulative && Some(quarter) != constraint.quarters.max() {
                    continue;
                }
                let known: Decimal = constraint
                    .quarters
                    .iter()
                    .filter_map(|q| solved.get(&q).copied())
                    .sum();
                solved.insert(quarter, constraint.amount - known);
                changed = true;
            }
        }
    }

    let annual = annual_ytd.or_else(|| {
        (1..=4)
            .all(|q| solved.contains_key(&q))
            .then(|| solved.values().copied().sum())
    });

    SolvedYear {
        quarters: solved
            .into_iter()
            .map(|(q, v)| (q, v.to_f64().unwrap_or_default()))
            .collect(),
        annual: annual.and_then(|v| v.to_f64()),
    }
}
