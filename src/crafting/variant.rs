//! Recipe variants and how their inputs and outputs are priced.

use rust_decimal::Decimal;
use serde::Serialize;

use super::prices::{MarketPrices, Quote};
use crate::market::{IngredientRecord, RecipeRecord, VariantRecord};

/// Recipes that exist to level skills, not to sell.
const NON_TRADE_RECIPES: [&str; 2] = ["skill book", "research paper"];

/// Craft time floor so instant recipes do not divide by zero.
const MIN_CRAFT_TIME: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Items that satisfy a tag ingredient.
pub fn tag_items(tag: &str) -> Option<&'static [&'static str]> {
    match tag {
        "Wood" => Some(&["Lumber", "Board"]),
        "Wood Board" => Some(&["Board"]),
        "Lumber" => Some(&["Lumber"]),
        "Rock" => Some(&["Stone", "Granite", "Limestone"]),
        "Oil" => Some(&["Oil", "Flaxseed Oil"]),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillNeed {
    pub skill: String,
    pub level: Option<u32>,
}

/// Recipe metadata shared by every analysis of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantInfo {
    /// Recipe key.
    pub recipe: String,
    /// Variant name.
    pub name: String,
    /// Currency the variant was priced in.
    pub currency: String,
    pub crafting_table: Option<String>,
    pub skills: Vec<SkillNeed>,
    /// Seconds per craft, defaulting to 1.
    pub craft_time: Decimal,
    pub labor_cost: Option<Decimal>,
}

impl VariantInfo {
    /// Profit per second of crafting.
    pub fn per_second(&self, profit: Decimal) -> Option<Decimal> {
        profit.checked_div(self.craft_time.max(MIN_CRAFT_TIME))
    }

    /// First listed skill.
    pub fn primary_skill(&self) -> Option<&str> {
        self.skills.first().map(|s| s.skill.as_str())
    }
}

/// A bought ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientLine {
    /// Item bought; for a tag ingredient, the cheapest matching item.
    pub item: String,
    /// Units per craft.
    pub amount: Decimal,
    pub unit_price: Decimal,
    pub store: String,
    /// Seller's stock.
    pub available: Decimal,
}

impl IngredientLine {
    fn new(item: &str, amount: Decimal, quote: &Quote) -> Self {
        Self {
            item: item.to_string(),
            amount,
            unit_price: quote.price,
            store: quote.store.clone(),
            available: quote.quantity,
        }
    }

    /// Cost per craft.
    pub fn cost(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(self.amount)
    }

    /// Whole crafts the seller's stock covers.
    pub fn max_batches(&self) -> Option<Decimal> {
        Some(self.available.checked_div(self.amount)?.floor())
    }
}

/// A sold product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductLine {
    pub item: String,
    /// Units per craft.
    pub amount: Decimal,
    /// Best buyer's price.
    pub unit_price: Decimal,
    /// Best buyer.
    pub store: String,
    /// Best buyer's demand.
    pub demand: Decimal,
}

impl ProductLine {
    pub(crate) fn new(item: &str, amount: Decimal, quote: &Quote) -> Self {
        Self {
            item: item.to_string(),
            amount,
            unit_price: quote.price,
            store: quote.store.clone(),
            demand: quote.quantity,
        }
    }

    /// Revenue per craft.
    pub fn revenue(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(self.amount)
    }

    /// Whole crafts the buyer's demand absorbs.
    pub fn max_batches(&self) -> Option<Decimal> {
        Some(self.demand.checked_div(self.amount)?.floor())
    }
}

/// A variant with a name and positive amounts on every line.
pub(crate) struct Candidate<'a> {
    pub recipe: &'a RecipeRecord,
    pub key: &'a str,
    pub name: &'a str,
    pub ingredients: Vec<(&'a IngredientRecord, Decimal)>,
    pub products: Vec<(&'a str, Decimal)>,
}

impl Candidate<'_> {
    pub fn info(&self, currency: &str) -> VariantInfo {
        VariantInfo {
            recipe: self.key.to_string(),
            name: self.name.to_string(),
            currency: currency.to_string(),
            crafting_table: self.recipe.crafting_table.clone(),
            skills: self
                .recipe
                .skill_needs
                .iter()
                .filter_map(|need| {
                    Some(SkillNeed {
                        skill: need.skill.clone()?,
                        level: need.level,
                    })
                })
                .collect(),
            craft_time: self.recipe.base_craft_time.unwrap_or(Decimal::ONE),
            labor_cost: self.recipe.base_labor_cost,
        }
    }

    /// Price every ingredient from its cheapest seller. None if any cannot
    /// be bought.
    pub fn price_ingredients(&self, prices: &MarketPrices) -> Option<Vec<IngredientLine>> {
        self.ingredients
            .iter()
            .map(|(ingredient, amount)| price_ingredient(ingredient, *amount, prices))
            .collect()
    }

    /// Units produced per craft across all products.
    pub fn units_out(&self) -> Decimal {
        self.products.iter().map(|(_, amount)| *amount).sum()
    }
}

/// Variants worth pricing, in payload order.
pub(crate) fn candidates(recipes: &[RecipeRecord]) -> impl Iterator<Item = Candidate<'_>> {
    recipes
        .iter()
        .filter_map(|recipe| {
            let key = recipe.key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
            let lower = key.to_lowercase();
            if NON_TRADE_RECIPES.iter().any(|word| lower.contains(word)) {
                return None;
            }
            Some((recipe, key))
        })
        .flat_map(|(recipe, key)| {
            recipe
                .variants
                .iter()
                .filter_map(move |variant| candidate(recipe, key, variant))
        })
}

fn candidate<'a>(
    recipe: &'a RecipeRecord,
    key: &'a str,
    variant: &'a VariantRecord,
) -> Option<Candidate<'a>> {
    if variant.ingredients.is_empty() || variant.products.is_empty() {
        return None;
    }

    let ingredients = variant
        .ingredients
        .iter()
        .map(|ingredient| Some((ingredient, positive(ingredient.amount)?)))
        .collect::<Option<Vec<_>>>()?;
    let products = variant
        .products
        .iter()
        .map(|product| Some((product.name.as_deref()?, positive(product.amount)?)))
        .collect::<Option<Vec<_>>>()?;

    Some(Candidate {
        recipe,
        key,
        name: variant.name.as_deref().unwrap_or(key),
        ingredients,
        products,
    })
}

fn positive(amount: Option<Decimal>) -> Option<Decimal> {
    amount.filter(|a| a.is_sign_positive() && !a.is_zero())
}

/// Cheapest way to buy one ingredient.
fn price_ingredient(
    ingredient: &IngredientRecord,
    amount: Decimal,
    prices: &MarketPrices,
) -> Option<IngredientLine> {
    if ingredient.is_specific_item == Some(true) {
        let item = ingredient.name.as_deref()?;
        let quote = prices.cheapest_seller(item)?;
        return Some(IngredientLine::new(item, amount, quote));
    }

    let tag = ingredient.tag.as_deref()?;
    let mut best: Option<(&str, &Quote)> = None;
    for item in tag_items(tag)? {
        if let Some(quote) = prices.cheapest_seller(item) {
            if best.map_or(true, |(_, b)| quote.price < b.price) {
                best = Some((item, quote));
            }
        }
    }
    best.map(|(item, quote)| IngredientLine::new(item, amount, quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crafting::prices::prices_by_currency;
    use crate::market::{Direction, Listing, ListingSet, ProductRecord};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn market(sellers: &[(&str, &str, Decimal)]) -> MarketPrices {
        let set = ListingSet {
            listings: sellers
                .iter()
                .map(|(item, store, price)| {
                    Listing::new(*item, *store, Direction::Sell, *price, "Credits")
                        .with_quantity(dec!(100))
                })
                .collect(),
            ..ListingSet::default()
        };
        prices_by_currency(&set, &BTreeSet::new())
            .remove("Credits")
            .unwrap_or_default()
    }

    fn tagged(tag: &str, amount: Decimal) -> IngredientRecord {
        IngredientRecord {
            name: None,
            tag: Some(tag.to_string()),
            is_specific_item: Some(false),
            amount: Some(amount),
        }
    }

    fn recipe(key: &str, variants: Vec<VariantRecord>) -> RecipeRecord {
        RecipeRecord {
            key: Some(key.to_string()),
            variants,
            ..RecipeRecord::default()
        }
    }

    fn variant(ingredients: Vec<IngredientRecord>, products: &[(&str, Decimal)]) -> VariantRecord {
        VariantRecord {
            name: products.first().map(|(n, _)| n.to_string()),
            ingredients,
            products: products
                .iter()
                .map(|(name, amount)| ProductRecord {
                    name: Some(name.to_string()),
                    amount: Some(*amount),
                })
                .collect(),
        }
    }

    #[test]
    fn tag_picks_cheapest_matching_item() {
        let prices = market(&[("Granite", "Quarry", dec!(3)), ("Stone", "Pit", dec!(2))]);

        let line = price_ingredient(&tagged("Rock", dec!(4)), dec!(4), &prices).unwrap();
        assert_eq!(line.item, "Stone");
        assert_eq!(line.store, "Pit");
        assert_eq!(line.cost(), Some(dec!(8)));
        assert_eq!(line.max_batches(), Some(dec!(25)));

        assert!(price_ingredient(&tagged("Fabric", dec!(1)), dec!(1), &prices).is_none());
        assert!(price_ingredient(&tagged("Oil", dec!(1)), dec!(1), &prices).is_none());
    }

    #[test]
    fn skips_training_recipes_and_incomplete_variants() {
        let board = variant(vec![tagged("Wood", dec!(1))], &[("Board", dec!(1))]);
        let recipes = vec![
            recipe("Carpentry Skill Book", vec![board.clone()]),
            recipe("Basic Research Paper", vec![board.clone()]),
            recipe("Board", vec![board.clone()]),
            recipe("Empty", vec![variant(vec![], &[("Board", dec!(1))])]),
            recipe("Zero", vec![variant(vec![tagged("Wood", dec!(0))], &[("Board", dec!(1))])]),
            RecipeRecord::default(),
        ];

        let names: Vec<_> = candidates(&recipes).map(|c| c.key).collect();
        assert_eq!(names, vec!["Board"]);
    }

    #[test]
    fn per_second_uses_time_floor() {
        let recipes = vec![RecipeRecord {
            base_craft_time: Some(Decimal::ZERO),
            ..recipe("Board", vec![variant(vec![tagged("Wood", dec!(1))], &[("Board", dec!(2))])])
        }];
        let candidate = candidates(&recipes).next().unwrap();
        let info = candidate.info("Credits");

        assert_eq!(info.per_second(dec!(3)), Some(dec!(30)));
        assert_eq!(candidate.units_out(), dec!(2));
        assert_eq!(info.primary_skill(), None);
    }
}
