//! Classification of reporting intervals into fiscal quarter spans.

use crate::types::{QuarterSet, quarter_of};
use chrono::{Datelike, NaiveDate};

/// Duration thresholds mapping an interval's day count to a quarter-span
/// length.
///
/// Calibrated to typical quarter lengths under the K-IFRS fiscal calendar.
/// They are heuristics, not guarantees: filings do not always flag their
/// cumulative status, and duration is the only observable proxy. Callers
/// with non-standard quarter boundaries can supply their own limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanThresholds {
    /// Maximum inclusive day count for a one-quarter span.
    pub q1_max_days: i64,
    /// Maximum inclusive day count for a two-quarter span.
    pub q2_max_days: i64,
    /// Maximum inclusive day count for a three-quarter span.
    pub q3_max_days: i64,
}

impl Default for SpanThresholds {
    fn default() -> Self {
        Self {
            q1_max_days: 111,
            q2_max_days: 201,
            q3_max_days: 291,
        }
    }
}

impl SpanThresholds {
    /// Span length for an inclusive day count, clamped so the span never
    /// reaches before quarter 1 of the reporting year. The second value is
    /// true when the duration lands exactly on a threshold, where the
    /// heuristic is at its least trustworthy.
    fn span_len(&self, days: i64, q_end: u8) -> (u8, bool) {
        let limits = [
            (1u8, self.q1_max_days),
            (2, self.q2_max_days),
            (3, self.q3_max_days),
        ];
        for (k, max_days) in limits {
            if days <= max_days {
                return (k.min(q_end), days == max_days);
            }
        }
        (q_end, false)
    }
}

/// Result of classifying one reporting interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanClass {
    /// Quarters the interval's amount covers.
    pub quarters: QuarterSet,
    /// Whether the amount is a year-to-date running total.
    pub cumulative: bool,
    /// Whether the duration fell exactly on a span threshold.
    pub ambiguous: bool,
}

/// Classify with the default K-IFRS thresholds.
pub fn classify(start: Option<NaiveDate>, end: NaiveDate) -> SpanClass {
    classify_with(start, end, &SpanThresholds::default())
}

/// Map a reporting interval to the quarters it covers and whether it is a
/// year-to-date cumulative figure.
///
/// An absent `start` means a point-in-time figure covering only `end`'s
/// quarter. A `start` of January 1 in `end`'s year is authoritative
/// evidence of a cumulative filing covering quarters 1 through `end`'s.
/// Anything else falls back to the duration heuristic, which is never
/// flagged cumulative.
pub fn classify_with(
    start: Option<NaiveDate>,
    end: NaiveDate,
    thresholds: &SpanThresholds,
) -> SpanClass {
    let q_end = quarter_of(end);

    let Some(start) = start else {
        return SpanClass {
            quarters: QuarterSet::single(q_end),
            cumulative: false,
            ambiguous: false,
        };
    };

    if start.month() == 1 && start.day() == 1 && start.year() == end.year() {
        return SpanClass {
            quarters: QuarterSet::range(1, q_end),
            cumulative: true,
            ambiguous: false,
        };
    }

    let days = (end - start).num_days() + 1;
    let (k, ambiguous) = thresholds.span_len(days, q_end);
    SpanClass {
        quarters: QuarterSet::range(q_end - k + 1, q_end),
        cumulative: false,
        ambiguous,
    }
}
