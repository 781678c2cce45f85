//! Deal monitor: diffing successive opportunity sets.
//!
//! The engine is stateless. Anything that wants to know which deals are new
//! or gone keeps the previous [`DealBook`] itself and passes it back in.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::calculator::Opportunity;
use super::detector::rank;

/// Identity of a deal across cycles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DealKey {
    /// Item traded.
    pub item: String,
    /// Store bought from.
    pub source: String,
    /// Store sold to.
    pub destination: String,
}

impl From<&Opportunity> for DealKey {
    fn from(opp: &Opportunity) -> Self {
        Self {
            item: opp.item.clone(),
            source: opp.source_store.clone(),
            destination: opp.destination_store.clone(),
        }
    }
}

/// Last-seen deals keyed by identity.
pub type DealBook = BTreeMap<DealKey, Opportunity>;

/// Changes between two cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealDiff {
    /// Deals present now but not before, ranked.
    pub appeared: Vec<Opportunity>,
    /// Deals present before but not now, ranked by their last-seen values.
    pub disappeared: Vec<Opportunity>,
    /// Deals present in both cycles.
    pub retained: usize,
}

impl DealDiff {
    /// True if nothing appeared or disappeared.
    pub fn is_unchanged(&self) -> bool {
        self.appeared.is_empty() && self.disappeared.is_empty()
    }
}

/// Build a book from one cycle's opportunities.
///
/// When several opportunities share a key (same stores, different
/// currencies) the best-ranked one is kept.
pub fn book_from(opportunities: &[Opportunity]) -> DealBook {
    let mut book = DealBook::new();
    for opp in opportunities {
        book.entry(DealKey::from(opp))
            .and_modify(|existing| {
                if rank(opp, existing).is_lt() {
                    *existing = opp.clone();
                }
            })
            .or_insert_with(|| opp.clone());
    }
    book
}

/// Compare the previous book against the current opportunities.
///
/// Returns the diff and the book to keep for the next cycle.
pub fn diff_deals(previous: &DealBook, current: &[Opportunity]) -> (DealDiff, DealBook) {
    let next = book_from(current);

    let mut appeared: Vec<Opportunity> = next
        .iter()
        .filter(|(key, _)| !previous.contains_key(*key))
        .map(|(_, opp)| opp.clone())
        .collect();
    let mut disappeared: Vec<Opportunity> = previous
        .iter()
        .filter(|(key, _)| !next.contains_key(*key))
        .map(|(_, opp)| opp.clone())
        .collect();
    let retained = next.len() - appeared.len();

    appeared.sort_by(rank);
    disappeared.sort_by(rank);

    (
        DealDiff {
            appeared,
            disappeared,
            retained,
        },
        next,
    )
}

/// Total profit of a deal, or its per-unit profit when the tradeable
/// quantity is unknown.
pub fn deal_value(opp: &Opportunity) -> Decimal {
    opp.total_profit().unwrap_or(opp.profit)
}

/// Keep the deals worth at least `threshold` in total.
pub fn good_deals(opportunities: &[Opportunity], threshold: Decimal) -> Vec<Opportunity> {
    opportunities
        .iter()
        .filter(|opp| deal_value(opp) >= threshold)
        .cloned()
        .collect()
}

/// What one monitor observation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// First observation: every current deal, ranked.
    Baseline(Vec<Opportunity>),
    /// Later observation: what changed since the last one.
    Changes(DealDiff),
}

/// Holds the last-seen deals between monitor cycles.
#[derive(Debug, Clone, Default)]
pub struct DealMonitor {
    book: Option<DealBook>,
}

impl DealMonitor {
    /// Monitor with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously saved book.
    pub fn with_book(book: DealBook) -> Self {
        Self { book: Some(book) }
    }

    /// Deals tracked after the last observation.
    pub fn book(&self) -> Option<&DealBook> {
        self.book.as_ref()
    }

    /// Record one cycle's opportunities.
    pub fn observe(&mut self, current: &[Opportunity]) -> MonitorEvent {
        match self.book.take() {
            None => {
                let book = book_from(current);
                let mut deals: Vec<Opportunity> = book.values().cloned().collect();
                deals.sort_by(rank);
                self.book = Some(book);
                MonitorEvent::Baseline(deals)
            }
            Some(previous) => {
                let (diff, next) = diff_deals(&previous, current);
                self.book = Some(next);
                MonitorEvent::Changes(diff)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::{calculate_opportunity, scan, EngineConfig};
    use crate::market::{Direction, Listing, MockStoreBuilder};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn opp(item: &str, source: &str, dest: &str, buy: Decimal, sell: Decimal) -> Opportunity {
        calculate_opportunity(
            &Listing::new(item, source, Direction::Sell, buy, "Credits"),
            &Listing::new(item, dest, Direction::Buy, sell, "Credits"),
            dec!(50),
        )
        .unwrap()
    }

    #[test]
    fn diff_reports_appeared_and_disappeared() {
        let wood = opp("Wood", "A", "B", dec!(10), dec!(70));
        let iron = opp("Iron", "A", "C", dec!(5), dec!(80));
        let clay = opp("Clay", "D", "B", dec!(1), dec!(60));

        let previous = book_from(&[wood.clone(), iron.clone()]);
        let (diff, next) = diff_deals(&previous, &[wood.clone(), clay.clone()]);

        assert_eq!(diff.appeared, vec![clay]);
        assert_eq!(diff.disappeared, vec![iron]);
        assert_eq!(diff.retained, 1);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn price_change_is_not_a_new_deal() {
        let before = opp("Wood", "A", "B", dec!(10), dec!(70));
        let after = opp("Wood", "A", "B", dec!(12), dec!(90));

        let (diff, next) = diff_deals(&book_from(&[before]), &[after.clone()]);

        assert!(diff.is_unchanged());
        assert_eq!(diff.retained, 1);
        assert_eq!(next.values().next(), Some(&after));
    }

    #[test]
    fn monitor_baseline_then_changes() {
        let mut monitor = DealMonitor::new();
        let wood = opp("Wood", "A", "B", dec!(10), dec!(70));
        let iron = opp("Iron", "A", "C", dec!(5), dec!(80));

        let first = monitor.observe(&[wood.clone(), iron.clone()]);
        assert_eq!(first, MonitorEvent::Baseline(vec![iron.clone(), wood.clone()]));

        let second = monitor.observe(&[wood.clone(), iron.clone()]);
        assert!(matches!(second, MonitorEvent::Changes(ref d) if d.is_unchanged()));

        let third = monitor.observe(&[wood]);
        match third {
            MonitorEvent::Changes(diff) => assert_eq!(diff.disappeared, vec![iron]),
            other => panic!("expected changes, got {:?}", other),
        }
        assert_eq!(monitor.book().map(|b| b.len()), Some(1));
    }

    #[test]
    fn empty_cycles_are_valid() {
        let mut monitor = DealMonitor::with_book(DealBook::new());
        let event = monitor.observe(&[]);
        assert_eq!(event, MonitorEvent::Changes(DealDiff::default()));
    }

    #[test]
    fn threshold_applies_to_total_profit() {
        // 5 per unit on its own is far below 50, but 20 units make 100.
        let stores = vec![
            MockStoreBuilder::new("A", "Credits")
                .sells("Wood", dec!(10), dec!(20))
                .build(),
            MockStoreBuilder::new("B", "Credits")
                .buys("Wood", dec!(15), dec!(20))
                .build(),
        ];
        let engine = EngineConfig {
            min_profit: Decimal::ZERO,
            ..EngineConfig::default()
        };
        let found = scan(&stores, &engine);

        let deals = good_deals(&found.opportunities, dec!(50));
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].total_profit(), Some(dec!(100)));

        assert!(good_deals(&found.opportunities, dec!(101)).is_empty());
    }

    #[test]
    fn unknown_quantity_falls_back_to_unit_profit() {
        let wood = opp("Wood", "A", "B", dec!(10), dec!(70));
        assert_eq!(wood.total_profit(), None);
        assert_eq!(deal_value(&wood), dec!(60));

        assert_eq!(good_deals(&[wood.clone()], dec!(50)), vec![wood]);
        assert!(good_deals(&[opp("Iron", "A", "B", dec!(10), dec!(40))], dec!(50)).is_empty());
    }
}
