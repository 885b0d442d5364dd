//! High-level reporting service: ticker in, reconciled financials out.

use crate::dart::{CompanyProfile, DartClient};
use crate::directory::CorpDirectory;
use crate::error::{DataError, Result};
use crate::fetch::{DailyCache, FetchConfig, fetch_grid};
use log::info;
use quartile_core::{ReportAggregator, SpanThresholds, StructuredFinancials, normalize};
use serde::Serialize;

/// Company profile plus its reconciled quarterly financials.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredReport {
    /// Registry profile of the company.
    pub company: CompanyProfile,
    /// Per-basis, per-statement, per-account quarterly series.
    pub financials: StructuredFinancials,
}

/// Fetches every available filing for a company and reduces them to
/// standalone quarterly figures.
#[derive(Debug)]
pub struct StructuredFinancialsService {
    client: DartClient,
    cache: DailyCache,
    config: FetchConfig,
    thresholds: SpanThresholds,
}

impl StructuredFinancialsService {
    /// Service with default fetch settings and span thresholds.
    pub fn new(client: DartClient) -> Self {
        Self::with_config(client, FetchConfig::default(), SpanThresholds::default())
    }

    /// Service with explicit fetch settings and span thresholds.
    pub fn with_config(
        client: DartClient,
        config: FetchConfig,
        thresholds: SpanThresholds,
    ) -> Self {
        Self {
            client,
            cache: DailyCache::new(),
            config,
            thresholds,
        }
    }

    /// Underlying DART client.
    pub fn client(&self) -> &DartClient {
        &self.client
    }

    /// Build the full structured report for a six-digit stock code.
    pub async fn get(
        &self,
        directory: &CorpDirectory,
        stock_code: &str,
    ) -> Result<StructuredReport> {
        let corp = directory
            .find_by_stock_code(stock_code)?
            .ok_or_else(|| DataError::CorpNotFound(stock_code.to_string()))?;

        info!(
            "building structured report for {} ({})",
            corp.corp_name, corp.corp_code
        );

        let company = self.client.company(&corp.corp_code).await?;
        let batches = fetch_grid(&self.client, &self.cache, &corp.corp_code, &self.config).await?;

        let mut aggregator = ReportAggregator::with_thresholds(self.thresholds);
        for batch in &batches {
            aggregator.ingest_batch(batch);
        }

        Ok(StructuredReport {
            company,
            financials: normalize(&aggregator),
        })
    }
}
