//! Best available prices per item, built from normalized listings.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::market::{Direction, Listing, ListingSet};

/// One store's offer on one side of the market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub store: String,
    pub price: Decimal,
    /// Stock for sellers, demand for buyers.
    pub quantity: Decimal,
}

impl Quote {
    fn from_listing(listing: &Listing) -> Option<Self> {
        Some(Self {
            store: listing.store.clone(),
            price: listing.price,
            quantity: listing.quantity?,
        })
    }
}

/// Both sides of the market for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPrices {
    /// Cheapest store selling the item: where ingredients are bought.
    pub cheapest_seller: Option<Quote>,
    /// Every store buying the item, highest price first.
    pub buyers: Vec<Quote>,
}

impl ItemPrices {
    /// Highest-paying buyer.
    pub fn best_buyer(&self) -> Option<&Quote> {
        self.buyers.first()
    }

    /// Buyers not in `excluded`, highest price first.
    pub fn buyers_excluding<'a>(
        &'a self,
        excluded: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a Quote> + 'a {
        self.buyers
            .iter()
            .filter(move |quote| !excluded.contains(&quote.store))
    }
}

/// Prices for every item traded in one currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketPrices {
    pub currency: String,
    items: BTreeMap<String, ItemPrices>,
}

impl MarketPrices {
    /// Prices for `item`, if any store trades it.
    pub fn item(&self, item: &str) -> Option<&ItemPrices> {
        self.items.get(item)
    }

    /// Cheapest seller of `item`.
    pub fn cheapest_seller(&self, item: &str) -> Option<&Quote> {
        self.item(item)?.cheapest_seller.as_ref()
    }

    /// Number of items with at least one quote.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn add(&mut self, listing: &Listing) {
        // Availability checks need a quantity.
        let Some(quote) = Quote::from_listing(listing) else {
            return;
        };
        let prices = self.items.entry(listing.item.clone()).or_default();

        match listing.direction {
            Direction::Sell => {
                let cheaper = prices
                    .cheapest_seller
                    .as_ref()
                    .map_or(true, |best| quote.price < best.price);
                if cheaper {
                    prices.cheapest_seller = Some(quote);
                }
            }
            Direction::Buy => prices.buyers.push(quote),
        }
    }
}

/// Group listings by currency into price tables.
///
/// Listings must already be normalized, so unlisted prices and empty
/// stock are gone. Listings with unknown quantity are ignored. A non-empty
/// `currencies` keeps only those currencies.
pub fn prices_by_currency(
    set: &ListingSet,
    currencies: &BTreeSet<String>,
) -> BTreeMap<String, MarketPrices> {
    let mut tables: BTreeMap<String, MarketPrices> = BTreeMap::new();

    for listing in &set.listings {
        if !currencies.is_empty() && !currencies.contains(&listing.currency) {
            continue;
        }
        tables
            .entry(listing.currency.clone())
            .or_insert_with(|| MarketPrices {
                currency: listing.currency.clone(),
                ..MarketPrices::default()
            })
            .add(listing);
    }

    for table in tables.values_mut() {
        for prices in table.items.values_mut() {
            // Stable, so equal prices keep payload order.
            prices.buyers.sort_by(|a, b| b.price.cmp(&a.price));
        }
    }

    tables
}
