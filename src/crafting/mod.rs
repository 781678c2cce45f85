//! Crafting and profession profit analysis.
//!
//! This module handles:
//! - Best market prices per item and currency
//! - Pricing recipe variants from the cheapest sellers and best buyers
//! - Ranking individual crafts by sellable profit
//! - Ranking professions by the demand their recipes can fill
//!
//! Every variant is priced within one currency. A recipe whose inputs and
//! outputs trade in different currencies is not profitable in any of them.

pub mod analysis;
pub mod pipeline;
pub mod prices;
pub mod professions;
pub mod variant;

use std::collections::BTreeSet;

use rust_decimal::Decimal;

pub use analysis::{analyze_crafting, CraftingOpportunity};
pub use pipeline::{CraftingPipeline, CraftingScan};
pub use prices::{prices_by_currency, ItemPrices, MarketPrices, Quote};
pub use professions::{analyze_professions, ProfessionOpportunity, ProfessionSummary};
pub use variant::{tag_items, IngredientLine, ProductLine, SkillNeed, VariantInfo};

/// Minimum profit per craft, and per sellable batch run.
pub const MIN_CRAFTING_PROFIT: Decimal = Decimal::ONE;

/// Stock an ingredient seller must hold, whatever the recipe needs.
pub const MIN_INGREDIENT_QUANTITY: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Batches the market must support on both ends.
pub const MIN_RECIPE_BATCHES: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Total potential a recipe needs to count towards its profession.
pub const MIN_PROFESSION_PROFIT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Buyer ignored by profession analysis unless configured otherwise.
pub const DEFAULT_EXCLUDED_BUYER: &str = "Low Hanging Fruit";

/// Parameters for both analyses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftingConfig {
    /// Minimum profit per craft and per batch run.
    pub min_profit: Decimal,
    /// Floor on each ingredient seller's stock.
    pub min_ingredient_quantity: Decimal,
    /// Batches the ingredient stock and product demand must cover.
    pub min_batches: Decimal,
    /// Minimum total potential for a recipe to count in profession rankings.
    pub min_profession_profit: Decimal,
    /// Currency allow-list, empty for all.
    pub currencies: BTreeSet<String>,
    /// Stores whose buy orders profession analysis ignores.
    pub excluded_buyers: BTreeSet<String>,
}

impl Default for CraftingConfig {
    fn default() -> Self {
        Self {
            min_profit: MIN_CRAFTING_PROFIT,
            min_ingredient_quantity: MIN_INGREDIENT_QUANTITY,
            min_batches: MIN_RECIPE_BATCHES,
            min_profession_profit: MIN_PROFESSION_PROFIT,
            currencies: BTreeSet::new(),
            excluded_buyers: BTreeSet::from([DEFAULT_EXCLUDED_BUYER.to_string()]),
        }
    }
}
