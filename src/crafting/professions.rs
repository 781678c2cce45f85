//! Profession rankings by the demand their recipes could fill.
//!
//! Ingredient stock is assumed unlimited here. A recipe's potential is the
//! profit from filling every buy order for its products, which makes this
//! a measure of how much a profession's output is wanted rather than what
//! one player can craft today.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::prices::{MarketPrices, Quote};
use super::variant::{candidates, Candidate, IngredientLine, ProductLine, VariantInfo};
use super::CraftingConfig;
use crate::market::RecipeRecord;

/// One profitable recipe variant for a profession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionOpportunity {
    pub variant: VariantInfo,
    pub ingredients: Vec<IngredientLine>,
    /// Each product priced at its best buyer.
    pub products: Vec<ProductLine>,
    pub cost: Decimal,
    pub revenue: Decimal,
    /// Revenue minus cost per craft.
    pub profit: Decimal,
    /// Profit from filling every buyer's order.
    pub total_profit: Decimal,
    /// Units wanted by every buyer of every product.
    pub total_demand: Decimal,
}

impl ProfessionOpportunity {
    pub fn margin_pct(&self) -> Option<Decimal> {
        if self.cost.is_zero() {
            return None;
        }
        self.profit
            .checked_div(self.cost)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    pub fn profit_per_second(&self) -> Option<Decimal> {
        self.variant.per_second(self.profit)
    }
}

/// A profession's combined potential in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionSummary {
    /// Primary skill of the recipes.
    pub profession: String,
    pub currency: String,
    /// Sum of the recipes' potential.
    pub total_profit: Decimal,
    /// Qualifying recipes, best first.
    pub opportunities: Vec<ProfessionOpportunity>,
}

impl ProfessionSummary {
    pub fn recipe_count(&self) -> usize {
        self.opportunities.len()
    }

    /// Mean potential per qualifying recipe.
    pub fn average_profit(&self) -> Option<Decimal> {
        self.total_profit
            .checked_div(Decimal::from(self.opportunities.len()))
    }

    pub fn best(&self) -> Option<&ProfessionOpportunity> {
        self.opportunities.first()
    }
}

/// Group profitable recipes by primary profession and rank the professions.
///
/// Only recipes whose potential reaches `min_profession_profit` count.
/// Buyers in `excluded_buyers` are ignored.
pub fn analyze_professions(
    recipes: &[RecipeRecord],
    markets: &BTreeMap<String, MarketPrices>,
    config: &CraftingConfig,
) -> Vec<ProfessionSummary> {
    let mut grouped: BTreeMap<(String, String), Vec<ProfessionOpportunity>> = BTreeMap::new();

    for prices in markets.values() {
        for candidate in candidates(recipes) {
            let Some(opp) = evaluate(&candidate, prices, config) else {
                continue;
            };
            if opp.total_profit < config.min_profession_profit {
                continue;
            }
            let Some(profession) = opp.variant.primary_skill().map(str::to_string) else {
                continue;
            };
            grouped
                .entry((profession, prices.currency.clone()))
                .or_default()
                .push(opp);
        }
    }

    let mut summaries: Vec<ProfessionSummary> = grouped
        .into_iter()
        .filter_map(|((profession, currency), mut opportunities)| {
            opportunities.sort_by(rank);
            let total_profit = opportunities
                .iter()
                .try_fold(Decimal::ZERO, |sum, opp| sum.checked_add(opp.total_profit))?;
            Some(ProfessionSummary {
                profession,
                currency,
                total_profit,
                opportunities,
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_profit
            .cmp(&a.total_profit)
            .then_with(|| a.profession.cmp(&b.profession))
            .then_with(|| a.currency.cmp(&b.currency))
    });

    debug!(professions = summaries.len(), "Profession analysis complete");
    summaries
}

fn rank(a: &ProfessionOpportunity, b: &ProfessionOpportunity) -> Ordering {
    b.total_profit
        .cmp(&a.total_profit)
        .then_with(|| b.profit.cmp(&a.profit))
        .then_with(|| a.variant.name.cmp(&b.variant.name))
}

fn evaluate(
    candidate: &Candidate<'_>,
    prices: &MarketPrices,
    config: &CraftingConfig,
) -> Option<ProfessionOpportunity> {
    if candidate.recipe.skill_needs.is_empty() {
        return None;
    }

    let ingredients = candidate.price_ingredients(prices)?;
    let cost = ingredients
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.cost()?))?;

    let mut products = Vec::with_capacity(candidate.products.len());
    let mut buyers: Vec<Vec<&Quote>> = Vec::with_capacity(candidate.products.len());
    for (item, amount) in &candidate.products {
        let wanted: Vec<&Quote> = prices
            .item(item)?
            .buyers_excluding(&config.excluded_buyers)
            .collect();
        let best = wanted.first()?;
        products.push(ProductLine::new(item, *amount, best));
        buyers.push(wanted);
    }

    let revenue = products
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.revenue()?))?;
    let profit = revenue.checked_sub(cost)?;
    if profit <= Decimal::ZERO {
        return None;
    }

    // Ingredient cost spread evenly over every unit produced.
    let unit_cost = cost.checked_div(candidate.units_out())?;

    let mut total_profit = Decimal::ZERO;
    let mut total_demand = Decimal::ZERO;
    for (line, wanted) in products.iter().zip(&buyers) {
        for buyer in wanted {
            total_demand = total_demand.checked_add(buyer.quantity)?;
            let batches = buyer.quantity.checked_div(line.amount)?.floor();
            if batches.is_zero() {
                continue;
            }
            let filled = buyer
                .price
                .checked_sub(unit_cost)?
                .checked_mul(line.amount)?
                .checked_mul(batches)?;
            total_profit = total_profit.checked_add(filled)?;
        }
    }

    Some(ProfessionOpportunity {
        variant: candidate.info(&prices.currency),
        ingredients,
        products,
        cost,
        revenue,
        profit,
        total_profit,
        total_demand,
    })
}
