//! End-to-end reconciliation: raw filing entries in, nested JSON view out.

use chrono::NaiveDate;
use quartile_core::{
    ConsolidationBasis, FilingEntry, ReportAggregator, StatementKind, normalize,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn balance(basis: ConsolidationBasis, account: &str, amount: &str, end: NaiveDate) -> FilingEntry {
    FilingEntry {
        basis,
        statement: StatementKind::Balance,
        account: account.to_string(),
        amount: amount.to_string(),
        end,
        start: None,
    }
}

fn flow(
    basis: ConsolidationBasis,
    account: &str,
    amount: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> FilingEntry {
    FilingEntry {
        basis,
        statement: StatementKind::Flow,
        account: account.to_string(),
        amount: amount.to_string(),
        end,
        start: Some(start),
    }
}

/// A year of typical filings: Q1 YTD, half-year YTD, nine-month YTD and the
/// annual report, for one flow account and one balance account on both
/// consolidation bases.
fn typical_year(basis: ConsolidationBasis) -> Vec<FilingEntry> {
    let jan1 = date(2022, 1, 1);
    vec![
        flow(basis, "매출액", "1,000", jan1, date(2022, 3, 31)),
        flow(basis, "매출액", "2,100", jan1, date(2022, 6, 30)),
        flow(basis, "매출액", "3,300", jan1, date(2022, 9, 30)),
        flow(basis, "매출액", "4,600", jan1, date(2022, 12, 31)),
        balance(basis, "자산총계", "50,000", date(2022, 3, 31)),
        balance(basis, "자산총계", "51,000", date(2022, 6, 30)),
        balance(basis, "자산총계", "52,500", date(2022, 9, 30)),
        balance(basis, "자산총계", "53,000", date(2022, 12, 31)),
    ]
}

#[test]
fn reconciles_a_full_reporting_year() {
    let mut agg = ReportAggregator::new();
    agg.ingest_batch(&typical_year(ConsolidationBasis::Consolidated));
    agg.ingest_batch(&typical_year(ConsolidationBasis::Standalone));

    let out = normalize(&agg);

    let revenue =
        &out[&ConsolidationBasis::Consolidated][&StatementKind::Flow]["매출액"][&2022];
    assert_eq!(revenue.quarters[&1], 1000.0);
    assert_eq!(revenue.quarters[&2], 1100.0);
    assert_eq!(revenue.quarters[&3], 1200.0);
    assert_eq!(revenue.quarters[&4], 1300.0);
    assert_eq!(revenue.annual, Some(4600.0));

    let sum: f64 = (1..=4).map(|q| revenue.quarters[&q]).sum();
    approx::assert_relative_eq!(sum, revenue.annual.unwrap(), max_relative = 1e-9);

    let assets =
        &out[&ConsolidationBasis::Standalone][&StatementKind::Balance]["자산총계"][&2022];
    assert_eq!(assets.quarters[&4], 53000.0);
    assert_eq!(assets.annual, None);
}

#[test]
fn batch_completion_order_does_not_change_the_view() {
    let batch = typical_year(ConsolidationBasis::Consolidated);

    let mut forward = ReportAggregator::new();
    forward.ingest_batch(&batch);

    let mut backward = ReportAggregator::new();
    let reversed: Vec<_> = batch.iter().rev().cloned().collect();
    backward.ingest_batch(&reversed);

    assert_eq!(normalize(&forward), normalize(&backward));
}

#[test]
fn serialized_view_has_deterministic_key_order() {
    let mut agg = ReportAggregator::new();
    agg.ingest_batch(&typical_year(ConsolidationBasis::Consolidated));

    let json = serde_json::to_value(normalize(&agg)).unwrap();
    let year = &json["consolidated"]["flow"]["매출액"]["2022"];
    let keys: Vec<&String> = year.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["1", "2", "3", "4", "all"]);
}

#[test]
fn underdetermined_years_emit_only_what_is_known() {
    // Only the nine-month cumulative and the Q4 report survived upstream.
    let jan1 = date(2021, 1, 1);
    let entries = vec![
        flow(ConsolidationBasis::Consolidated, "영업이익", "90", jan1, date(2021, 9, 30)),
        flow(
            ConsolidationBasis::Consolidated,
            "영업이익",
            "30",
            date(2021, 10, 1),
            date(2021, 12, 31),
        ),
    ];

    let mut agg = ReportAggregator::new();
    agg.ingest_batch(&entries);
    let out = normalize(&agg);

    let year = &out[&ConsolidationBasis::Consolidated][&StatementKind::Flow]["영업이익"][&2021];
    assert_eq!(year.quarters.keys().copied().collect::<Vec<_>>(), vec![4]);
    // The nine-month cumulative reaches the highest quarter filed, so it is
    // still the annual candidate.
    assert_eq!(year.annual, Some(90.0));
}
