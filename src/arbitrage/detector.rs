//! Arbitrage opportunity detection across stores.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use super::calculator::{calculate_opportunity, Opportunity};
use crate::market::{Direction, Listing, ListingSet, StoreRecord};

/// Parameters for one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum per-unit profit to report.
    pub min_profit: Decimal,
    /// Currency allow-list, empty for all.
    pub currencies: BTreeSet<String>,
    /// Remaining balance below which a deal is flagged as low liquidity.
    pub liquidity_margin: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_profit: Decimal::new(10, 0),
            currencies: BTreeSet::new(),
            liquidity_margin: Decimal::new(50, 0),
        }
    }
}

impl EngineConfig {
    /// Whether listings in `currency` pass the filter.
    pub fn allows_currency(&self, currency: &str) -> bool {
        self.currencies.is_empty() || self.currencies.contains(currency)
    }
}

/// Result of one engine run over a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    /// Ranked opportunities.
    pub opportunities: Vec<Opportunity>,
    /// Usable listings considered.
    pub listings: usize,
    /// Malformed records skipped.
    pub skipped: usize,
    /// Untradeable records ignored.
    pub inactive: usize,
}

/// Normalize raw stores and compute opportunities.
pub fn scan(stores: &[StoreRecord], config: &EngineConfig) -> Scan {
    scan_listings(&ListingSet::from_stores(stores), config)
}

/// Compute opportunities for an already-normalized listing set.
#[instrument(skip_all, fields(listings = set.len(), min_profit = %config.min_profit))]
pub fn scan_listings(set: &ListingSet, config: &EngineConfig) -> Scan {
    let opportunities = compute_opportunities(&set.listings, config);

    info!(
        opportunities = opportunities.len(),
        skipped = set.skipped,
        "Arbitrage scan complete"
    );

    Scan {
        opportunities,
        listings: set.len(),
        skipped: set.skipped,
        inactive: set.inactive,
    }
}

/// Find every profitable sell/buy pairing across distinct stores.
///
/// The full cross product of sell and buy offers is considered within each
/// (item, currency) group, so several stores at the same price all surface.
/// Output is ranked by [`rank`].
pub fn compute_opportunities(listings: &[Listing], config: &EngineConfig) -> Vec<Opportunity> {
    let mut groups: BTreeMap<(&str, &str), (Vec<&Listing>, Vec<&Listing>)> = BTreeMap::new();

    for listing in listings {
        if !config.allows_currency(&listing.currency) {
            continue;
        }
        let (sells, buys) = groups
            .entry((listing.item.as_str(), listing.currency.as_str()))
            .or_default();
        match listing.direction {
            Direction::Sell => sells.push(listing),
            Direction::Buy => buys.push(listing),
        }
    }

    let mut opportunities = Vec::new();

    for ((item, currency), (sells, buys)) in &groups {
        if sells.is_empty() || buys.is_empty() {
            continue;
        }

        let before = opportunities.len();
        for sell_offer in sells {
            for buy_offer in buys {
                let Some(opp) = calculate_opportunity(sell_offer, buy_offer, config.liquidity_margin)
                else {
                    continue;
                };
                if opp.profit >= config.min_profit {
                    opportunities.push(opp);
                }
            }
        }

        if opportunities.len() > before {
            debug!(
                item = %item,
                currency = %currency,
                found = opportunities.len() - before,
                "Opportunities for item"
            );
        }
    }

    opportunities.sort_by(rank);
    opportunities
}

/// Ranking order: profit descending, then item name ascending ignoring case.
///
/// Store names and buy price break any remaining tie so output is stable.
pub fn rank(a: &Opportunity, b: &Opportunity) -> Ordering {
    b.profit
        .cmp(&a.profit)
        .then_with(|| a.item.to_lowercase().cmp(&b.item.to_lowercase()))
        .then_with(|| a.item.cmp(&b.item))
        .then_with(|| a.source_store.cmp(&b.source_store))
        .then_with(|| a.destination_store.cmp(&b.destination_store))
        .then_with(|| a.buy_price.cmp(&b.buy_price))
}
