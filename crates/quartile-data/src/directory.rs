//! Corporate-identifier directory with a once-per-day on-disk cache.
//!
//! DART identifies companies by an eight-digit corporate code; tickers and
//! names have to be resolved through a directory the API ships as a zipped
//! XML file of roughly a hundred thousand rows. The directory changes
//! rarely, so it is persisted to SQLite and refreshed at most once per
//! calendar day.

use crate::dart::client::DartClient;
use crate::error::{DataError, Result};
use chrono::{Local, NaiveDate};
use log::info;
use quick_xml::Reader;
use quick_xml::events::Event;
use rusqlite::{Connection, OptionalExtension, params};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// One directory row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpInfo {
    /// Eight-digit DART corporate code.
    pub corp_code: String,
    /// Registered company name.
    pub corp_name: String,
    /// Six-digit KRX stock code; absent for unlisted companies.
    pub stock_code: Option<String>,
    /// Last modification date as reported by DART (`YYYYMMDD`).
    pub modify_date: String,
}

/// SQLite-backed corporate directory.
#[derive(Debug)]
pub struct CorpDirectory {
    conn: Connection,
}

impl CorpDirectory {
    /// Open (or create) the directory database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let directory = Self { conn };
        directory.initialize_schema()?;
        Ok(directory)
    }

    /// In-memory directory (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let directory = Self { conn };
        directory.initialize_schema()?;
        Ok(directory)
    }

    /// Platform-specific default database path, e.g.
    /// `~/.cache/quartile/directory.db` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quartile")
            .join("directory.db")
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS corps (
                corp_code TEXT PRIMARY KEY,
                corp_name TEXT NOT NULL,
                stock_code TEXT,
                modify_date TEXT NOT NULL
            )",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_corps_stock_code ON corps(stock_code)",
            [],
        )?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Date the directory was last downloaded, if ever.
    pub fn fetched_on(&self) -> Result<Option<NaiveDate>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'fetched_on'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value.and_then(|text| NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok()))
    }

    /// Download and re-populate the directory unless it was already
    /// fetched today. Returns whether a refresh happened.
    pub async fn refresh_if_stale(&self, client: &DartClient) -> Result<bool> {
        let today = Local::now().date_naive();
        if self.fetched_on()? == Some(today) {
            return Ok(false);
        }

        info!("downloading corporate directory from DART");
        let payload = client.get_bytes("corpCode.xml", &[]).await?;
        let xml = extract_corp_xml(&payload)?;
        let corps = parse_corp_xml(&xml)?;
        self.replace_all(&corps)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('fetched_on', ?1)",
            params![today.to_string()],
        )?;
        info!("corporate directory refreshed: {} companies", corps.len());
        Ok(true)
    }

    /// Replace every directory row in one transaction.
    pub fn replace_all(&self, corps: &[CorpInfo]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM corps", [])?;
        for corp in corps {
            tx.execute(
                "INSERT OR REPLACE INTO corps (corp_code, corp_name, stock_code, modify_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![corp.corp_code, corp.corp_name, corp.stock_code, corp.modify_date],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Look up a company by its six-digit stock code.
    pub fn find_by_stock_code(&self, stock_code: &str) -> Result<Option<CorpInfo>> {
        self.query_one(
            "SELECT corp_code, corp_name, stock_code, modify_date
             FROM corps WHERE stock_code = ?1",
            stock_code,
        )
    }

    /// Look up a company by its registered name.
    pub fn find_by_name(&self, corp_name: &str) -> Result<Option<CorpInfo>> {
        self.query_one(
            "SELECT corp_code, corp_name, stock_code, modify_date
             FROM corps WHERE corp_name = ?1",
            corp_name,
        )
    }

    fn query_one(&self, sql: &str, value: &str) -> Result<Option<CorpInfo>> {
        let result = self
            .conn
            .query_row(sql, params![value], |row| {
                Ok(CorpInfo {
                    corp_code: row.get(0)?,
                    corp_name: row.get(1)?,
                    stock_code: row.get(2)?,
                    modify_date: row.get(3)?,
                })
            })
            .optional()?;
        Ok(result)
    }

    /// Number of companies in the directory.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM corps", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Pull the single XML entry out of the zipped directory payload.
fn extract_corp_xml(payload: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(payload))
        .map_err(|e| DataError::Archive(e.to_string()))?;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| DataError::Archive(e.to_string()))?;
        if file.name().ends_with(".xml") {
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;
            return Ok(xml);
        }
    }

    Err(DataError::Archive(
        "no XML entry in corpCode payload".to_string(),
    ))
}

/// Parse the directory XML (`<result><list>...</list>...</result>`).
fn parse_corp_xml(xml: &str) -> Result<Vec<CorpInfo>> {
    #[derive(Default)]
    struct Row {
        corp_code: String,
        corp_name: String,
        stock_code: String,
        modify_date: String,
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut corps = Vec::new();
    let mut current: Option<Row> = None;
    let mut field: Vec<u8> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => match start.name().as_ref() {
                b"list" => current = Some(Row::default()),
                tag => field = tag.to_vec(),
            },
            Ok(Event::Text(text)) => {
                if let Some(row) = current.as_mut() {
                    let value = text
                        .unescape()
                        .map_err(|e| DataError::Xml(e.to_string()))?
                        .trim()
                        .to_string();
                    match field.as_slice() {
                        b"corp_code" => row.corp_code = value,
                        b"corp_name" => row.corp_name = value,
                        b"stock_code" => row.stock_code = value,
                        b"modify_date" => row.modify_date = value,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(end)) => {
                field.clear();
                if end.name().as_ref() == b"list"
                    && let Some(row) = current.take()
                {
                    corps.push(CorpInfo {
                        corp_code: row.corp_code,
                        corp_name: row.corp_name,
                        stock_code: (!row.stock_code.is_empty()).then_some(row.stock_code),
                        modify_date: row.modify_date,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(DataError::Xml(e.to_string())),
        }
    }

    Ok(corps)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<result>
    <list>
        <corp_code>00126380</corp_code>
        <corp_name>삼성전자(주)</corp_name>
        <stock_code>005930</stock_code>
        <modify_date>20230530</modify_date>
    </list>
    <list>
        <corp_code>00434003</corp_code>
        <corp_name>다코</corp_name>
        <stock_code> </stock_code>
        <modify_date>20170630</modify_date>
    </list>
</result>"#;

    #[test]
    fn test_parse_corp_xml() {
        let corps = parse_corp_xml(SAMPLE_XML).unwrap();
        assert_eq!(corps.len(), 2);
        assert_eq!(corps[0].corp_code, "00126380");
        assert_eq!(corps[0].stock_code.as_deref(), Some("005930"));
        // Unlisted companies carry a blank stock code.
        assert_eq!(corps[1].stock_code, None);
    }

    #[test]
    fn test_lookup_round_trip() {
        let directory = CorpDirectory::in_memory().unwrap();
        let corps = parse_corp_xml(SAMPLE_XML).unwrap();
        directory.replace_all(&corps).unwrap();

        assert_eq!(directory.count().unwrap(), 2);

        let found = directory.find_by_stock_code("005930").unwrap().unwrap();
        assert_eq!(found.corp_code, "00126380");

        let found = directory.find_by_name("다코").unwrap().unwrap();
        assert_eq!(found.corp_code, "00434003");

        assert!(directory.find_by_stock_code("000000").unwrap().is_none());
    }

    #[test]
    fn test_replace_all_is_a_full_swap() {
        let directory = CorpDirectory::in_memory().unwrap();
        let corps = parse_corp_xml(SAMPLE_XML).unwrap();
        directory.replace_all(&corps).unwrap();
        directory.replace_all(&corps[..1].to_vec()).unwrap();
        assert_eq!(directory.count().unwrap(), 1);
        assert!(directory.find_by_name("다코").unwrap().is_none());
    }

    #[test]
    fn test_fetched_on_starts_empty() {
        let directory = CorpDirectory::in_memory().unwrap();
        assert_eq!(directory.fetched_on().unwrap(), None);
    }
}
