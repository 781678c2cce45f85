//! Fetch stores and recipes, then run both analyses.

use chrono::{DateTime, Local};
use tracing::{info, instrument, warn};

use super::analysis::{analyze_crafting, CraftingOpportunity};
use super::prices::prices_by_currency;
use super::professions::{analyze_professions, ProfessionSummary};
use super::CraftingConfig;
use crate::error::FetchError;
use crate::market::{ListingSet, MarketSource, RecipeSource};
use crate::metrics;

/// Output of one crafting run.
#[derive(Debug, Clone)]
pub struct CraftingScan {
    pub generated_at: DateTime<Local>,
    /// Individual crafts, best total first.
    pub crafting: Vec<CraftingOpportunity>,
    /// Professions, best total first.
    pub professions: Vec<ProfessionSummary>,
    /// Recipes in the payload.
    pub recipes: usize,
    /// Items with at least one sized quote, across currencies.
    pub priced_items: usize,
    /// Store records dropped as malformed.
    pub skipped: usize,
}

/// Runs one store fetch, one recipe fetch and both analyses per call.
#[derive(Debug, Clone)]
pub struct CraftingPipeline<S, R> {
    stores: S,
    recipes: R,
    config: CraftingConfig,
}

impl<S: MarketSource, R: RecipeSource> CraftingPipeline<S, R> {
    pub fn new(stores: S, recipes: R, config: CraftingConfig) -> Self {
        Self {
            stores,
            recipes,
            config,
        }
    }

    pub fn config(&self) -> &CraftingConfig {
        &self.config
    }

    /// Analyze the current market. Either fetch failing fails the run.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result<CraftingScan, FetchError> {
        let (stores, recipes) =
            tokio::try_join!(self.stores.fetch_stores(), self.recipes.fetch_recipes())
                .inspect_err(|e| warn!(error = %e, "Crafting fetch failed"))?;

        let set = ListingSet::from_stores(stores.stores());
        let markets = prices_by_currency(&set, &self.config.currencies);

        let crafting = analyze_crafting(&recipes.recipes, &markets, &self.config);
        let professions = analyze_professions(&recipes.recipes, &markets, &self.config);

        metrics::add_records_skipped(set.skipped);

        info!(
            recipes = recipes.recipes.len(),
            crafts = crafting.len(),
            professions = professions.len(),
            "Crafting analysis generated"
        );

        Ok(CraftingScan {
            generated_at: Local::now(),
            crafting,
            professions,
            recipes: recipes.recipes.len(),
            priced_items: markets.values().map(|m| m.len()).sum(),
            skipped: set.skipped,
        })
    }
}
