//! Rendering for the crafting and profession reports.

use std::collections::BTreeSet;
use std::fmt::Write;

use rust_decimal::Decimal;

use super::emoji::item_emoji;
use super::format::{money, percent};
use crate::crafting::{CraftingOpportunity, CraftingScan, ProfessionSummary, VariantInfo};

/// Crafts listed before the "more" note.
pub const CRAFTING_LIMIT: usize = 20;

/// Recipes listed under each profession.
pub const PROFESSION_TOP_RECIPES: usize = 3;

const CRAFT_SIREN: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
const CRAFT_STAR: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const PROFESSION_SIREN: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);
const PROFESSION_STAR: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

const PROFESSION_EMOJI: &[(&[&str], &str)] = &[
    (&["mining"], "⛏️"),
    (&["masonry"], "🧱"),
    (&["carpentry", "wood"], "🪚"),
    (&["smithing", "metal"], "🔨"),
    (&["tailoring", "fabric"], "🧵"),
    (&["cooking", "culinary"], "👨‍🍳"),
    (&["farming", "agriculture"], "🌾"),
    (&["hunting"], "🏹"),
    (&["gathering"], "🌿"),
    (&["engineering", "mechanic"], "⚙️"),
    (&["glassworking"], "🔮"),
    (&["pottery"], "🏺"),
];

/// Pick an emoji for a profession name.
pub fn profession_emoji(profession: &str) -> &'static str {
    let lower = profession.to_lowercase();
    PROFESSION_EMOJI
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, emoji)| *emoji)
        .unwrap_or("🛠️")
}

fn highlight(text: String, amount: Decimal, siren: Decimal, star: Decimal) -> String {
    if amount >= siren {
        format!("🚨 {} 🚨", text)
    } else if amount >= star {
        format!("⭐ {} ⭐", text)
    } else {
        text
    }
}

fn timestamp(scan: &CraftingScan) -> String {
    scan.generated_at.format("%Y-%m-%d %H:%M").to_string()
}

fn table_line(variant: &VariantInfo) -> String {
    let mut line = format!(
        "Table: {} | Time: {}s",
        variant.crafting_table.as_deref().unwrap_or("Unknown"),
        variant.craft_time.normalize()
    );
    if !variant.skills.is_empty() {
        let skills: Vec<String> = variant
            .skills
            .iter()
            .map(|s| match s.level {
                Some(level) => format!("{} Lv.{}", s.skill, level),
                None => s.skill.clone(),
            })
            .collect();
        let _ = write!(line, " | Skills: {}", skills.join(", "));
    }
    line
}

/// Markdown crafting report, at most `limit` entries.
pub fn render_crafting(scan: &CraftingScan, limit: usize) -> String {
    let mut out = String::new();
    let crafts = &scan.crafting;

    let _ = writeln!(out, "**Crafting Profit Report** - {}", timestamp(scan));
    let _ = writeln!(
        out,
        "Found {} profitable crafting opportunities ({} recipes, {} priced items):",
        crafts.len(),
        scan.recipes,
        scan.priced_items
    );
    let _ = writeln!(out);

    if crafts.is_empty() {
        out.push_str("No profitable crafting opportunities found.");
        return out;
    }

    for (i, opp) in crafts.iter().take(limit).enumerate() {
        render_craft(&mut out, i + 1, opp);
    }

    if crafts.len() > limit {
        let _ = writeln!(out, "...and {} more opportunities", crafts.len() - limit);
    }

    out
}

fn render_craft(out: &mut String, rank: usize, opp: &CraftingOpportunity) {
    let variant = &opp.variant;
    let total = highlight(
        format!("{} {} TOTAL PROFIT", money(opp.total_profit), variant.currency),
        opp.total_profit,
        CRAFT_SIREN,
        CRAFT_STAR,
    );

    let _ = writeln!(
        out,
        "**{}. {} {}** - {}",
        rank,
        item_emoji(&variant.name),
        variant.name,
        total
    );
    let _ = writeln!(
        out,
        "Unit profit: {} | Profit/sec: {} | {} margin",
        money(opp.profit),
        opp.profit_per_second()
            .map(money)
            .unwrap_or_else(|| "n/a".to_string()),
        percent(opp.margin_pct())
    );
    let _ = writeln!(out, "{}", table_line(variant));

    let ingredients: Vec<String> = opp
        .ingredients
        .iter()
        .map(|ing| {
            format!(
                "{}x {} ({} at {}, {} avail)",
                ing.amount.normalize(),
                ing.item,
                money(ing.unit_price),
                ing.store,
                ing.available.normalize()
            )
        })
        .collect();
    let _ = writeln!(out, "Ingredients: {}", ingredients.join(", "));

    let products: Vec<String> = opp
        .products
        .iter()
        .map(|prod| {
            format!(
                "{}x {} ({} at {}, demand: {})",
                prod.amount.normalize(),
                prod.item,
                money(prod.unit_price),
                prod.store,
                prod.demand.normalize()
            )
        })
        .collect();
    let _ = writeln!(out, "Products: {}", products.join(", "));

    let _ = write!(out, "Max craftable: {} batches ", opp.max_batches().normalize());
    if let Some(side) = opp.limited_by() {
        let _ = write!(
            out,
            "(limited by {}: ingredients={}, demand={}) ",
            side,
            opp.batches_by_ingredients.normalize(),
            opp.batches_by_demand.normalize()
        );
    }
    let _ = writeln!(out, "({} total profit)", money(opp.total_profit));
    let _ = writeln!(out);
}

/// Markdown profession ranking.
pub fn render_professions(scan: &CraftingScan, excluded_buyers: &BTreeSet<String>) -> String {
    let mut out = String::new();
    let professions = &scan.professions;

    let _ = writeln!(out, "**Profession Profit Analysis Report** - {}", timestamp(scan));
    if !excluded_buyers.is_empty() {
        let names: Vec<&str> = excluded_buyers.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Excluded buyer stores: {}", names.join(", "));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "**METHODOLOGY:**");
    let _ = writeln!(out, "Potential assumes unlimited ingredients and fills every buy order.");
    let _ = writeln!(out, "• Ingredient costs: cheapest seller per item");
    let _ = writeln!(out, "• Recipe potential: (buyer price - cost per unit) × units each buyer wants");
    let _ = writeln!(out, "• Ranking: sum of recipe potential per profession");
    let _ = writeln!(out);

    if professions.is_empty() {
        out.push_str("No profitable crafting opportunities found for any profession.");
        return out;
    }

    let _ = writeln!(out, "**PROFESSION RANKINGS** (by total profit potential):");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out);

    for (i, summary) in professions.iter().enumerate() {
        render_profession(&mut out, i + 1, summary);
    }

    let combined = professions
        .iter()
        .try_fold(Decimal::ZERO, |sum, p| sum.checked_add(p.total_profit));
    let _ = writeln!(out, "**SUMMARY:**");
    let _ = writeln!(out, "Total analyzed professions: {}", professions.len());
    if let Some(combined) = combined {
        let _ = writeln!(out, "Combined profit potential: {}", money(combined));
    }
    if let Some(top) = professions.first() {
        let _ = writeln!(
            out,
            "Most profitable profession: {} ({} {})",
            top.profession,
            money(top.total_profit),
            top.currency
        );
    }

    out
}

fn render_profession(out: &mut String, rank: usize, summary: &ProfessionSummary) {
    let total = highlight(
        format!("{} {} TOTAL POTENTIAL", money(summary.total_profit), summary.currency),
        summary.total_profit,
        PROFESSION_SIREN,
        PROFESSION_STAR,
    );

    let _ = writeln!(
        out,
        "**{}. {} {}** - {}",
        rank,
        profession_emoji(&summary.profession),
        summary.profession,
        total
    );
    let _ = writeln!(
        out,
        "Profitable recipes: {} | Avg potential per recipe: {}",
        summary.recipe_count(),
        summary
            .average_profit()
            .map(money)
            .unwrap_or_else(|| "n/a".to_string())
    );
    if let Some(best) = summary.best() {
        let _ = writeln!(
            out,
            "Best opportunity: {} ({})",
            best.variant.name,
            money(best.total_profit)
        );
    }

    let _ = writeln!(out, "Top opportunities (based on demand):");
    for (i, opp) in summary
        .opportunities
        .iter()
        .take(PROFESSION_TOP_RECIPES)
        .enumerate()
    {
        let _ = writeln!(
            out,
            "  {}. {} {}: {} (demand: {} units, {}/craft)",
            i + 1,
            item_emoji(&opp.variant.name),
            opp.variant.name,
            money(opp.total_profit),
            opp.total_demand.normalize(),
            money(opp.profit)
        );
    }
    let _ = writeln!(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crafting::{IngredientLine, ProductLine, ProfessionOpportunity, SkillNeed};
    use chrono::Local;
    use rust_decimal_macros::dec;

    fn variant(name: &str) -> VariantInfo {
        VariantInfo {
            recipe: name.to_string(),
            name: name.to_string(),
            currency: "Credits".to_string(),
            crafting_table: Some("Sawmill".to_string()),
            skills: vec![SkillNeed {
                skill: "Carpentry".to_string(),
                level: Some(2),
            }],
            craft_time: dec!(1.5),
            labor_cost: None,
        }
    }

    fn ingredient() -> IngredientLine {
        IngredientLine {
            item: "Lumber".to_string(),
            amount: dec!(2),
            unit_price: dec!(2),
            store: "Mill".to_string(),
            available: dec!(200),
        }
    }

    fn product() -> ProductLine {
        ProductLine {
            item: "Board".to_string(),
            amount: dec!(1),
            unit_price: dec!(7),
            store: "Yard".to_string(),
            demand: dec!(30),
        }
    }

    fn craft(total: Decimal) -> CraftingOpportunity {
        CraftingOpportunity {
            variant: variant("Board"),
            ingredients: vec![ingredient()],
            products: vec![product()],
            cost: dec!(4),
            revenue: dec!(7),
            profit: dec!(3),
            batches_by_ingredients: dec!(100),
            batches_by_demand: dec!(30),
            total_profit: total,
        }
    }

    fn scan(crafting: Vec<CraftingOpportunity>, professions: Vec<ProfessionSummary>) -> CraftingScan {
        CraftingScan {
            generated_at: Local::now(),
            crafting,
            professions,
            recipes: 12,
            priced_items: 40,
            skipped: 0,
        }
    }

    #[test]
    fn crafting_report_shows_sizing() {
        let text = render_crafting(&scan(vec![craft(dec!(90)), craft(dec!(20))], vec![]), 1);

        assert!(text.contains("Found 2 profitable crafting opportunities (12 recipes, 40 priced items):"));
        assert!(text.contains("**1. 🪵 Board** - ⭐ 90.00 Credits TOTAL PROFIT ⭐"));
        assert!(text.contains("Unit profit: 3.00 | Profit/sec: 2.00 | 75% margin"));
        assert!(text.contains("Table: Sawmill | Time: 1.5s | Skills: Carpentry Lv.2"));
        assert!(text.contains("Ingredients: 2x Lumber (2.00 at Mill, 200 avail)"));
        assert!(text.contains("Products: 1x Board (7.00 at Yard, demand: 30)"));
        assert!(text.contains(
            "Max craftable: 30 batches (limited by demand: ingredients=100, demand=30) (90.00 total profit)"
        ));
        assert!(text.contains("...and 1 more opportunities"));
    }

    #[test]
    fn crafting_report_empty() {
        let text = render_crafting(&scan(vec![], vec![]), CRAFTING_LIMIT);
        assert!(text.ends_with("No profitable crafting opportunities found."));
    }

    #[test]
    fn profession_report_ranks_and_summarizes() {
        let opp = ProfessionOpportunity {
            variant: variant("Board"),
            ingredients: vec![ingredient()],
            products: vec![product()],
            cost: dec!(4),
            revenue: dec!(7),
            profit: dec!(3),
            total_profit: dec!(1200),
            total_demand: dec!(400),
        };
        let carpentry = ProfessionSummary {
            profession: "Carpentry".to_string(),
            currency: "Credits".to_string(),
            total_profit: dec!(1200),
            opportunities: vec![opp],
        };
        let excluded = BTreeSet::from(["Low Hanging Fruit".to_string()]);

        let text = render_professions(&scan(vec![], vec![carpentry]), &excluded);

        assert!(text.contains("Excluded buyer stores: Low Hanging Fruit"));
        assert!(text.contains("**1. 🪚 Carpentry** - 🚨 1200.00 Credits TOTAL POTENTIAL 🚨"));
        assert!(text.contains("Profitable recipes: 1 | Avg potential per recipe: 1200.00"));
        assert!(text.contains("  1. 🪵 Board: 1200.00 (demand: 400 units, 3.00/craft)"));
        assert!(text.contains("Most profitable profession: Carpentry (1200.00 Credits)"));
    }

    #[test]
    fn profession_emoji_falls_back() {
        assert_eq!(profession_emoji("Advanced Smelting"), "🛠️");
        assert_eq!(profession_emoji("Mining"), "⛏️");
        assert_eq!(profession_emoji("Basic Engineering"), "⚙️");
    }
}
