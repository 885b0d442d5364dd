//! Filing retrieval across the (year, quarter) grid, with a process-wide
//! cache that lives for one calendar day.
//!
//! DART publishes filings once, so within a day a repeated request for the
//! same (corporation, year, quarter) cell always returns the same rows.
//! Explicit "no data" responses are cached too: an absent filing is itself
//! information worth remembering, and the grid is mostly empty for recent
//! quarters.

use crate::dart::DartClient;
use crate::error::Result;
use chrono::{Datelike, Local, NaiveDate};
use futures::stream::{self, StreamExt, TryStreamExt};
use log::debug;
use quartile_core::{FilingEntry, quarter_of};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

/// Earliest fiscal year the single-account DART endpoint covers.
pub const FIRST_YEAR_SUPPORTED: i32 = 2015;

/// Fetch tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// First fiscal year to request.
    pub first_year: i32,
    /// Maximum number of in-flight filing requests.
    pub max_workers: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            first_year: FIRST_YEAR_SUPPORTED,
            max_workers: default_max_workers(),
        }
    }
}

fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        * 4
}

type CacheKey = (String, i32, u8);

#[derive(Default)]
struct CacheState {
    day: Option<NaiveDate>,
    entries: HashMap<CacheKey, Option<Arc<[FilingEntry]>>>,
}

/// Process-wide filing cache, cleared on the first access of each
/// calendar day.
pub struct DailyCache {
    clock: Box<dyn Fn() -> NaiveDate + Send + Sync>,
    inner: Mutex<CacheState>,
}

impl Default for DailyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DailyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("DailyCache")
            .field("day", &state.day)
            .field("entries", &state.entries.len())
            .finish()
    }
}

impl DailyCache {
    /// Cache keyed to the local calendar day.
    pub fn new() -> Self {
        Self::with_clock(|| Local::now().date_naive())
    }

    /// Cache with an injected clock (used in tests to force a rollover).
    pub fn with_clock<C>(clock: C) -> Self
    where
        C: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        Self {
            clock: Box::new(clock),
            inner: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, invoking `fetch` on a miss and caching its result.
    ///
    /// Successful responses are cached, including explicit absence.
    /// Errors propagate to the caller and leave the cache untouched so a
    /// transient failure is retried on the next call.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> Result<Option<Arc<[FilingEntry]>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Vec<FilingEntry>>>>,
    {
        let today = (self.clock)();
        {
            let mut state = self.lock();
            if state.day != Some(today) {
                debug!("filing cache rolled over to {today}");
                state.day = Some(today);
                state.entries.clear();
            }
            if let Some(cached) = state.entries.get(&key) {
                return Ok(cached.clone());
            }
        }

        let fetched = fetch().await?.map(|entries| Arc::from(entries) as Arc<[_]>);

        let mut state = self.lock();
        // A concurrent day change while the fetch was in flight would drop
        // this entry on the next rollover anyway.
        state.entries.insert(key, fetched.clone());
        Ok(fetched)
    }

    /// Current cache day according to the injected clock.
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }
}

/// Every (year, quarter) cell from `first_year` up to the quarter
/// containing `today`.
pub fn year_quarters(first_year: i32, today: NaiveDate) -> Vec<(i32, u8)> {
    let current_year = today.year();
    let current_quarter = quarter_of(today);

    let mut cells = Vec::new();
    for year in first_year..=current_year {
        let last = if year == current_year { current_quarter } else { 4 };
        for quarter in 1..=last {
            cells.push((year, quarter));
        }
    }
    cells
}

/// Fetch every filing batch for `corp_code` across the full grid, going
/// through `cache` and keeping at most `config.max_workers` requests in
/// flight. Empty cells are dropped from the result.
pub async fn fetch_grid(
    client: &DartClient,
    cache: &DailyCache,
    corp_code: &str,
    config: &FetchConfig,
) -> Result<Vec<Arc<[FilingEntry]>>> {
    let cells = year_quarters(config.first_year, cache.today());
    debug!(
        "fetching {} filing cells for corp {corp_code}",
        cells.len()
    );

    let batches: Vec<Option<Arc<[FilingEntry]>>> = stream::iter(cells)
        .map(|(year, quarter)| {
            let key = (corp_code.to_string(), year, quarter);
            async move {
                cache
                    .get_or_fetch(key, || client.filings(corp_code, year, quarter))
                    .await
            }
        })
        .buffer_unordered(config.max_workers)
        .try_collect()
        .await?;

    Ok(batches.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_key() -> CacheKey {
        ("00126380".to_string(), 2023, 1)
    }

    #[tokio::test]
    async fn test_same_day_requests_hit_cache() {
        let cache = DailyCache::with_clock(|| date(2024, 6, 3));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let result = cache
                .get_or_fetch(sample_key(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(Vec::new()))
                })
                .await
                .unwrap();
            assert!(result.is_some());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_day_rollover_refetches() {
        let today = Arc::new(Mutex::new(date(2024, 6, 3)));
        let clock = Arc::clone(&today);
        let cache = DailyCache::with_clock(move || *clock.lock().unwrap());
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            cache
                .get_or_fetch(sample_key(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(Vec::new()))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        *today.lock().unwrap() = date(2024, 6, 4);
        let counter = Arc::clone(&calls);
        cache
            .get_or_fetch(sample_key(), || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Vec::new()))
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_absence_is_cached() {
        let cache = DailyCache::with_clock(|| date(2024, 6, 3));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            let result = cache
                .get_or_fetch(sample_key(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await
                .unwrap();
            assert!(result.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = DailyCache::with_clock(|| date(2024, 6, 3));

        let failed = cache
            .get_or_fetch(sample_key(), || async {
                Err(DataError::Http("503 Service Unavailable".to_string()))
            })
            .await;
        assert!(failed.is_err());

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        cache
            .get_or_fetch(sample_key(), || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Vec::new()))
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_year_quarters_stops_at_current_quarter() {
        let cells = year_quarters(2022, date(2023, 8, 15));
        assert_eq!(cells.first(), Some(&(2022, 1)));
        assert_eq!(cells.last(), Some(&(2023, 3)));
        assert_eq!(cells.len(), 4 + 3);
    }

    #[test]
    fn test_year_quarters_single_cell() {
        let cells = year_quarters(2024, date(2024, 2, 1));
        assert_eq!(cells, vec![(2024, 1)]);
    }
}
