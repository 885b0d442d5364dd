//! The periodic-filings endpoint (`fnlttSinglAcnt`).

use crate::dart::client::{DartClient, STATUS_NO_DATA, STATUS_OK};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use log::debug;
use quartile_core::{ConsolidationBasis, FilingEntry, StatementKind};
use serde::Deserialize;

/// DART report code per fiscal quarter. Quarter 4 is the annual report.
pub(crate) fn report_code(quarter: u8) -> Option<&'static str> {
    match quarter {
        1 => Some("11013"),
        2 => Some("11012"),
        3 => Some("11014"),
        4 => Some("11011"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct FilingListResponse {
    status: String,
    message: String,
    #[serde(default)]
    list: Vec<FilingRow>,
}

/// One account row of a filings response, fields as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilingRow {
    /// Consolidation code: `CFS` or `OFS`.
    #[serde(default)]
    pub fs_div: String,
    /// Statement code: `BS` or `IS`.
    #[serde(default)]
    pub sj_div: String,
    /// Account name, e.g. "자산총계".
    #[serde(default)]
    pub account_nm: String,
    /// Current-term amount text.
    #[serde(default)]
    pub thstrm_amount: String,
    /// Current-term date text: `"YYYY.MM.DD 현재"` for balance rows,
    /// `"YYYY.MM.DD ~ YYYY.MM.DD"` for flow rows.
    #[serde(default)]
    pub thstrm_dt: String,
}

impl DartClient {
    /// Fetch the filings for one (corp, year, quarter) cell.
    ///
    /// `Ok(None)` means the upstream explicitly has no data for this period
    /// (DART status 013), which is normal for years before a company listed
    /// and for the not-yet-filed current quarter. Any other non-success
    /// status is an error.
    pub async fn filings(
        &self,
        corp_code: &str,
        year: i32,
        quarter: u8,
    ) -> Result<Option<Vec<FilingEntry>>> {
        let code = report_code(quarter).ok_or_else(|| {
            DataError::Parse(format!("quarter must be 1..=4, got {quarter}"))
        })?;
        let year_param = year.to_string();
        let params = [
            ("corp_code", corp_code),
            ("bsns_year", year_param.as_str()),
            ("reprt_code", code),
        ];

        let response: FilingListResponse = self.get_json("fnlttSinglAcnt.json", &params).await?;
        match response.status.as_str() {
            STATUS_OK => Ok(Some(entries_from_rows(response.list))),
            STATUS_NO_DATA => {
                debug!("no filings for {corp_code} Y{year} Q{quarter}");
                Ok(None)
            }
            status => Err(DataError::Api {
                status: status.to_string(),
                message: response.message,
            }),
        }
    }
}

/// Convert raw response rows into engine filing entries.
///
/// Rows with unrecognized consolidation or statement codes, or with dates
/// that fail to parse, are skipped individually; the rest of the batch is
/// unaffected.
pub fn entries_from_rows(rows: Vec<FilingRow>) -> Vec<FilingEntry> {
    rows.into_iter()
        .filter_map(|row| {
            let basis = match row.fs_div.as_str() {
                "CFS" => ConsolidationBasis::Consolidated,
                "OFS" => ConsolidationBasis::Standalone,
                _ => return None,
            };
            let statement = match row.sj_div.as_str() {
                "BS" => StatementKind::Balance,
                "IS" => StatementKind::Flow,
                _ => return None,
            };
            let (start, end) = parse_period(&row.thstrm_dt)?;
            Some(FilingEntry {
                basis,
                statement,
                account: row.account_nm,
                amount: row.thstrm_amount,
                end,
                start,
            })
        })
        .collect()
}

/// Parse a `thstrm_dt` value into an optional start and a mandatory end.
///
/// Flow rows carry `"start ~ end"`; balance rows a single date, often with
/// a trailing "현재" ("as of") marker.
fn parse_period(raw: &str) -> Option<(Option<NaiveDate>, NaiveDate)> {
    let raw = raw.trim();
    if let Some((start_text, end_text)) = raw.split_once('~') {
        let start = parse_date(start_text)?;
        let end = parse_date(end_text)?;
        Some((Some(start), end))
    } else {
        Some((None, parse_date(raw)?))
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let token = text.trim().split_whitespace().next()?;
    NaiveDate::parse_from_str(token, "%Y.%m.%d").ok()
}
