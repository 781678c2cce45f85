//! Fetch, scan and package a report.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::Report;
use crate::arbitrage::{scan, EngineConfig};
use crate::error::FetchError;
use crate::market::MarketSource;
use crate::metrics;

/// Per-request overrides of the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRequest {
    /// Maximum entries to render.
    pub limit: Option<usize>,
    /// Currency allow-list; `Some(empty)` means all currencies.
    pub currencies: Option<BTreeSet<String>>,
    /// Per-unit profit threshold.
    pub min_profit: Option<Decimal>,
}

impl ReportRequest {
    fn engine(&self, defaults: &EngineConfig) -> EngineConfig {
        EngineConfig {
            min_profit: self.min_profit.unwrap_or(defaults.min_profit),
            currencies: self
                .currencies
                .clone()
                .unwrap_or_else(|| defaults.currencies.clone()),
            liquidity_margin: defaults.liquidity_margin,
        }
    }
}

/// Runs one fetch and one engine pass per call.
#[derive(Debug, Clone)]
pub struct ReportPipeline<S> {
    source: S,
    engine: EngineConfig,
    limit: usize,
}

impl<S: MarketSource> ReportPipeline<S> {
    pub fn new(source: S, engine: EngineConfig, limit: usize) -> Self {
        Self {
            source,
            engine,
            limit,
        }
    }

    /// Underlying market source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Default engine parameters.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Generate a report.
    ///
    /// A fetch failure is returned as-is and the engine is not run, so a
    /// failed cycle never reads as an empty market.
    #[instrument(skip_all)]
    pub async fn run(&self, request: &ReportRequest) -> Result<Report, FetchError> {
        let payload = match self.source.fetch_stores().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Store fetch failed");
                return Err(e);
            }
        };

        let engine = request.engine(&self.engine);
        let scan = scan(payload.stores(), &engine);

        metrics::add_records_skipped(scan.skipped);
        metrics::set_opportunities(scan.opportunities.len());

        info!(
            stores = payload.stores().len(),
            listings = scan.listings,
            opportunities = scan.opportunities.len(),
            "Report generated"
        );

        Ok(Report::new(scan, &engine, request.limit.unwrap_or(self.limit)))
    }
}
