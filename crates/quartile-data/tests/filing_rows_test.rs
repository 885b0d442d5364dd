//! Integration tests for turning raw DART filing rows into reconciled
//! quarterly figures, without touching the network.

use quartile_core::{
    ConsolidationBasis, ReportAggregator, StatementKind, normalize,
};
use quartile_data::dart::FilingRow;
use quartile_data::dart::financials::entries_from_rows;

fn row(sj_div: &str, account: &str, amount: &str, period: &str) -> serde_json::Value {
    serde_json::json!({
        "fs_div": "CFS",
        "sj_div": sj_div,
        "account_nm": account,
        "thstrm_amount": amount,
        "thstrm_dt": period,
    })
}

fn rows_from_json(payload: serde_json::Value) -> Vec<FilingRow> {
    serde_json::from_value(payload).unwrap()
}

#[test]
fn test_year_of_rows_reconciles_to_quarters() {
    // Four cumulative income filings plus four balance snapshots, the
    // shape a full fiscal year of fnlttSinglAcnt responses takes.
    let rows = rows_from_json(serde_json::json!([
        row("IS", "매출액", "1,000", "2023.01.01 ~ 2023.03.31"),
        row("IS", "매출액", "2,100", "2023.01.01 ~ 2023.06.30"),
        row("IS", "매출액", "3,300", "2023.01.01 ~ 2023.09.30"),
        row("IS", "매출액", "4,600", "2023.01.01 ~ 2023.12.31"),
        row("BS", "자산총계", "9,000", "2023.03.31 현재"),
        row("BS", "자산총계", "9,500", "2023.12.31 현재"),
    ]));

    let entries = entries_from_rows(rows);
    assert_eq!(entries.len(), 6);

    let mut aggregator = ReportAggregator::new();
    aggregator.ingest_batch(&entries);
    let financials = normalize(&aggregator);

    let consolidated = &financials[&ConsolidationBasis::Consolidated];

    let revenue = &consolidated[&StatementKind::Flow]["매출액"][&2023];
    assert_eq!(revenue.quarters[&1], 1000.0);
    assert_eq!(revenue.quarters[&2], 1100.0);
    assert_eq!(revenue.quarters[&3], 1200.0);
    assert_eq!(revenue.quarters[&4], 1300.0);
    assert_eq!(revenue.annual, Some(4600.0));

    let assets = &consolidated[&StatementKind::Balance]["자산총계"][&2023];
    assert_eq!(assets.quarters[&1], 9000.0);
    assert_eq!(assets.quarters[&4], 9500.0);
    assert_eq!(assets.annual, None);
}

#[test]
fn test_unknown_divisions_are_skipped() {
    let rows = rows_from_json(serde_json::json!([
        row("IS", "매출액", "1,000", "2023.01.01 ~ 2023.03.31"),
        row("CF", "영업현금흐름", "500", "2023.01.01 ~ 2023.03.31"),
        {
            "fs_div": "???",
            "sj_div": "IS",
            "account_nm": "매출액",
            "thstrm_amount": "1",
            "thstrm_dt": "2023.01.01 ~ 2023.03.31",
        },
    ]));

    let entries = entries_from_rows(rows);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].statement, StatementKind::Flow);
}

#[test]
fn test_parenthetical_amounts_flow_through_as_negatives() {
    let rows = rows_from_json(serde_json::json!([
        row("IS", "당기순이익", "(1,234)", "2023.01.01 ~ 2023.03.31"),
    ]));

    let entries = entries_from_rows(rows);
    let mut aggregator = ReportAggregator::new();
    aggregator.ingest_batch(&entries);
    let financials = normalize(&aggregator);

    let net_income = &financials[&ConsolidationBasis::Consolidated][&StatementKind::Flow]
        ["당기순이익"][&2023];
    assert_eq!(net_income.quarters[&1], -1234.0);
}
