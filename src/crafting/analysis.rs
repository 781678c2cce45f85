//! Crafting profit: buy the inputs, craft, sell the outputs.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::prices::MarketPrices;
use super::variant::{candidates, Candidate, IngredientLine, ProductLine, VariantInfo};
use super::CraftingConfig;
use crate::market::RecipeRecord;

/// A variant that can be crafted and sold at a profit right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CraftingOpportunity {
    pub variant: VariantInfo,
    pub ingredients: Vec<IngredientLine>,
    pub products: Vec<ProductLine>,
    /// Ingredient cost per craft.
    pub cost: Decimal,
    /// Product revenue per craft.
    pub revenue: Decimal,
    /// Revenue minus cost per craft.
    pub profit: Decimal,
    /// Crafts the ingredient sellers' stock covers.
    pub batches_by_ingredients: Decimal,
    /// Crafts the product buyers' demand absorbs.
    pub batches_by_demand: Decimal,
    /// Profit over the crafts both sides allow.
    pub total_profit: Decimal,
}

impl CraftingOpportunity {
    /// Crafts both sides of the market allow.
    pub fn max_batches(&self) -> Decimal {
        self.batches_by_ingredients.min(self.batches_by_demand)
    }

    /// Profit as a percentage of cost. None when the inputs are free.
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

    /// Which side caps the batch count, if they differ.
    pub fn limited_by(&self) -> Option<&'static str> {
        match self.batches_by_ingredients.cmp(&self.batches_by_demand) {
            Ordering::Less => Some("ingredients"),
            Ordering::Greater => Some("demand"),
            Ordering::Equal => None,
        }
    }
}

/// Crafts that clear the profit floor, best total first.
///
/// Every ingredient seller must stock enough for `min_batches` crafts and
/// at least `min_ingredient_quantity` units. Every product needs a buyer
/// wanting at least `min_batches` units.
pub fn analyze_crafting(
    recipes: &[RecipeRecord],
    markets: &BTreeMap<String, MarketPrices>,
    config: &CraftingConfig,
) -> Vec<CraftingOpportunity> {
    let mut found: Vec<CraftingOpportunity> = markets
        .values()
        .flat_map(|prices| {
            candidates(recipes).filter_map(move |candidate| evaluate(&candidate, prices, config))
        })
        .collect();

    found.sort_by(rank);

    debug!(opportunities = found.len(), "Crafting analysis complete");
    found
}

/// Best total first, then per-craft profit, then name.
pub fn rank(a: &CraftingOpportunity, b: &CraftingOpportunity) -> Ordering {
    b.total_profit
        .cmp(&a.total_profit)
        .then_with(|| b.profit.cmp(&a.profit))
        .then_with(|| {
            a.variant
                .name
                .to_lowercase()
                .cmp(&b.variant.name.to_lowercase())
        })
        .then_with(|| a.variant.recipe.cmp(&b.variant.recipe))
        .then_with(|| a.variant.currency.cmp(&b.variant.currency))
}

fn evaluate(
    candidate: &Candidate<'_>,
    prices: &MarketPrices,
    config: &CraftingConfig,
) -> Option<CraftingOpportunity> {
    let ingredients = candidate.price_ingredients(prices)?;

    let mut cost = Decimal::ZERO;
    let mut batches_by_ingredients: Option<Decimal> = None;
    for line in &ingredients {
        let needed = line
            .amount
            .checked_mul(config.min_batches)?
            .max(config.min_ingredient_quantity);
        if line.available < needed {
            return None;
        }
        cost = cost.checked_add(line.cost()?)?;
        batches_by_ingredients = Some(min_of(batches_by_ingredients, line.max_batches()?));
    }

    let mut products = Vec::with_capacity(candidate.products.len());
    let mut revenue = Decimal::ZERO;
    let mut batches_by_demand: Option<Decimal> = None;
    for (item, amount) in &candidate.products {
        let buyer = prices.item(item)?.best_buyer()?;
        if buyer.quantity < config.min_batches {
            return None;
        }
        let line = ProductLine::new(item, *amount, buyer);
        revenue = revenue.checked_add(line.revenue()?)?;
        batches_by_demand = Some(min_of(batches_by_demand, line.max_batches()?));
        products.push(line);
    }

    let profit = revenue.checked_sub(cost)?;
    if profit < config.min_profit {
        return None;
    }

    let batches_by_ingredients = batches_by_ingredients?;
    let batches_by_demand = batches_by_demand?;
    let total_profit = profit.checked_mul(batches_by_ingredients.min(batches_by_demand))?;
    if total_profit < config.min_profit {
        return None;
    }

    Some(CraftingOpportunity {
        variant: candidate.info(&prices.currency),
        ingredients,
        products,
        cost,
        revenue,
        profit,
        batches_by_ingredients,
        batches_by_demand,
        total_profit,
    })
}

fn min_of(current: Option<Decimal>, next: Decimal) -> Decimal {
    current.map_or(next, |c| c.min(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crafting::prices_by_currency;
    use crate::market::{
        IngredientRecord, ListingSet, MockStoreBuilder, ProductRecord, SkillNeedRecord,
        StoreRecord, VariantRecord,
    };
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn markets(stores: Vec<StoreRecord>) -> BTreeMap<String, MarketPrices> {
        prices_by_currency(&ListingSet::from_stores(&stores), &BTreeSet::new())
    }

    fn item(name: &str, amount: Decimal) -> IngredientRecord {
        IngredientRecord {
            name: Some(name.to_string()),
            tag: None,
            is_specific_item: Some(true),
            amount: Some(amount),
        }
    }

    fn recipe(key: &str, ingredients: Vec<IngredientRecord>, products: &[(&str, Decimal)]) -> RecipeRecord {
        RecipeRecord {
            key: Some(key.to_string()),
            variants: vec![VariantRecord {
                name: Some(key.to_string()),
                ingredients,
                products: products
                    .iter()
                    .map(|(name, amount)| ProductRecord {
                        name: Some(name.to_string()),
                        amount: Some(*amount),
                    })
                    .collect(),
            }],
            skill_needs: vec![SkillNeedRecord {
                skill: Some("Smelting".to_string()),
                level: Some(1),
            }],
            crafting_table: Some("Bloomery".to_string()),
            base_craft_time: Some(dec!(2)),
            base_labor_cost: None,
        }
    }

    fn iron_bar() -> RecipeRecord {
        recipe("Iron Bar", vec![item("Iron Ore", dec!(2))], &[("Iron Bar", dec!(1))])
    }

    #[test]
    fn sizes_craft_by_stock_and_demand() {
        let markets = markets(vec![
            MockStoreBuilder::new("Mine", "Credits")
                .sells("Iron Ore", dec!(3), dec!(120))
                .build(),
            MockStoreBuilder::new("Forge", "Credits")
                .buys("Iron Bar", dec!(10), dec!(40))
                .build(),
        ]);

        let found = analyze_crafting(&[iron_bar()], &markets, &CraftingConfig::default());

        assert_eq!(found.len(), 1);
        let opp = &found[0];
        assert_eq!(opp.cost, dec!(6));
        assert_eq!(opp.revenue, dec!(10));
        assert_eq!(opp.profit, dec!(4));
        assert_eq!(opp.batches_by_ingredients, dec!(60));
        assert_eq!(opp.batches_by_demand, dec!(40));
        assert_eq!(opp.max_batches(), dec!(40));
        assert_eq!(opp.limited_by(), Some("demand"));
        assert_eq!(opp.total_profit, dec!(160));
        assert_eq!(opp.profit_per_second(), Some(dec!(2)));
        assert_eq!(opp.variant.primary_skill(), Some("Smelting"));
        assert_eq!(opp.ingredients[0].store, "Mine");
        assert_eq!(opp.products[0].store, "Forge");
    }

    #[test]
    fn thin_ingredient_stock_is_rejected() {
        // 40 in stock is under the 50-unit floor even though 5 crafts need 10.
        let markets = markets(vec![
            MockStoreBuilder::new("Mine", "Credits")
                .sells("Iron Ore", dec!(3), dec!(40))
                .build(),
            MockStoreBuilder::new("Forge", "Credits")
                .buys("Iron Bar", dec!(10), dec!(40))
                .build(),
        ]);
        assert!(analyze_crafting(&[iron_bar()], &markets, &CraftingConfig::default()).is_empty());

        // 50 units cover the floor but not 5 crafts of 20.
        let big = recipe("Iron Bar", vec![item("Iron Ore", dec!(20))], &[("Iron Bar", dec!(1))]);
        let markets = markets_with_ore(dec!(50), dec!(100));
        assert!(analyze_crafting(&[big], &markets, &CraftingConfig::default()).is_empty());
    }

    fn markets_with_ore(stock: Decimal, bar_price: Decimal) -> BTreeMap<String, MarketPrices> {
        markets(vec![
            MockStoreBuilder::new("Mine", "Credits")
                .sells("Iron Ore", dec!(3), stock)
                .build(),
            MockStoreBuilder::new("Forge", "Credits")
                .buys("Iron Bar", bar_price, dec!(40))
                .build(),
        ])
    }

    #[test]
    fn weak_demand_and_losses_are_rejected() {
        let weak = markets(vec![
            MockStoreBuilder::new("Mine", "Credits")
                .sells("Iron Ore", dec!(3), dec!(120))
                .build(),
            MockStoreBuilder::new("Forge", "Credits")
                .buys("Iron Bar", dec!(10), dec!(4))
                .build(),
        ]);
        assert!(analyze_crafting(&[iron_bar()], &weak, &CraftingConfig::default()).is_empty());

        // 2 ore at 3 costs 6; selling the bar at 6.5 leaves under 1 profit.
        let thin = markets_with_ore(dec!(120), dec!(6.5));
        assert!(analyze_crafting(&[iron_bar()], &thin, &CraftingConfig::default()).is_empty());
    }

    #[test]
    fn inputs_and_outputs_must_share_a_currency() {
        let markets = markets(vec![
            MockStoreBuilder::new("Mine", "Credits")
                .sells("Iron Ore", dec!(3), dec!(120))
                .build(),
            MockStoreBuilder::new("Forge", "Gold")
                .buys("Iron Bar", dec!(10), dec!(40))
                .build(),
        ]);
        assert!(analyze_crafting(&[iron_bar()], &markets, &CraftingConfig::default()).is_empty());
    }

    #[test]
    fn ranked_by_total_profit() {
        let nails = recipe("Nail", vec![item("Iron Bar", dec!(1))], &[("Nail", dec!(4))]);
        let markets = markets(vec![
            MockStoreBuilder::new("Mine", "Credits")
                .sells("Iron Ore", dec!(3), dec!(120))
                .sells("Iron Bar", dec!(5), dec!(500))
                .build(),
            MockStoreBuilder::new("Forge", "Credits")
                .buys("Iron Bar", dec!(10), dec!(40))
                .buys("Nail", dec!(2), dec!(2400))
                .build(),
        ]);

        let found = analyze_crafting(&[iron_bar(), nails], &markets, &CraftingConfig::default());
        let names: Vec<_> = found.iter().map(|o| o.variant.name.as_str()).collect();

        // Nails: 3 profit over 500 crafts (600 wanted). Bars: 4 profit over 40.
        assert_eq!(names, vec!["Nail", "Iron Bar"]);
        assert_eq!(found[0].total_profit, dec!(1500));
        assert_eq!(found[0].limited_by(), Some("ingredients"));
        assert_eq!(found[0].margin_pct(), Some(dec!(60)));
    }
}
