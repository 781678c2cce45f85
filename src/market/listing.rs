//! Normalized listings built from raw store records.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use super::types::{OfferRecord, StoreRecord};

/// Prices at or above this are the server's "not listed" placeholder.
pub const UNLISTED_PRICE: Decimal = Decimal::from_parts(999_999, 0, 0, false, 0);

static COLOR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<color=[^>]*>|</color>").expect("color tag pattern is valid"));

/// Which side of the trade a store is quoting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    /// The store buys the item: the price a seller receives.
    Buy,
    /// The store sells the item: the price a buyer pays.
    Sell,
}

/// One store's quoted price for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Item display name.
    pub item: String,
    /// Store name with markup removed.
    pub store: String,
    /// Buy or sell offer.
    pub direction: Direction,
    /// Unit price.
    pub price: Decimal,
    /// Currency name.
    pub currency: String,
    /// Stock or demand, when reported.
    pub quantity: Option<Decimal>,
    /// Store owner's funds, when reported.
    pub store_balance: Option<Decimal>,
}

impl Listing {
    /// Create a listing with no quantity or balance information.
    pub fn new(
        item: impl Into<String>,
        store: impl Into<String>,
        direction: Direction,
        price: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            item: item.into(),
            store: store.into(),
            direction,
            price,
            currency: currency.into(),
            quantity: None,
            store_balance: None,
        }
    }

    /// Set the available quantity.
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the store balance.
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.store_balance = Some(balance);
        self
    }
}

/// Listings from one fetch plus bookkeeping on what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSet {
    /// Valid, active listings.
    pub listings: Vec<Listing>,
    /// Records dropped because a required field was missing or invalid.
    pub skipped: usize,
    /// Well-formed records dropped because they cannot be traded.
    pub inactive: usize,
}

enum Verdict {
    Keep(Listing),
    Malformed,
    Inactive,
}

impl ListingSet {
    /// Normalize raw store records.
    pub fn from_stores(stores: &[StoreRecord]) -> Self {
        let mut set = ListingSet::default();

        for store in stores {
            if store.malformed {
                set.skipped += 1;
                continue;
            }

            let name = store.name.as_deref().map(clean_store_name);
            let currency = store
                .currency_name
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty());
            let enabled = store.enabled.unwrap_or(false);

            for offer in &store.all_offers {
                let verdict = match (name.as_deref(), currency) {
                    (Some(name), Some(currency)) if !name.is_empty() => {
                        if enabled {
                            classify(offer, name, currency, store.balance)
                        } else {
                            Verdict::Inactive
                        }
                    }
                    _ => Verdict::Malformed,
                };

                match verdict {
                    Verdict::Keep(listing) => set.listings.push(listing),
                    Verdict::Malformed => set.skipped += 1,
                    Verdict::Inactive => set.inactive += 1,
                }
            }
        }

        debug!(
            listings = set.listings.len(),
            skipped = set.skipped,
            inactive = set.inactive,
            "Normalized store listings"
        );

        set
    }

    /// Wrap already-valid listings.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            skipped: 0,
            inactive: 0,
        }
    }

    /// Number of usable listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// True if no listing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

fn classify(
    offer: &OfferRecord,
    store: &str,
    currency: &str,
    balance: Option<Decimal>,
) -> Verdict {
    let item = match offer.item_name.as_deref().map(str::trim) {
        Some(item) if !item.is_empty() => item,
        _ => return Verdict::Malformed,
    };
    let price = match offer.price {
        Some(price) if price >= Decimal::ZERO => price,
        _ => return Verdict::Malformed,
    };
    let direction = match offer.buying {
        Some(true) => Direction::Buy,
        Some(false) => Direction::Sell,
        None => return Verdict::Malformed,
    };

    if price >= UNLISTED_PRICE {
        return Verdict::Inactive;
    }
    if matches!(offer.quantity, Some(q) if q <= Decimal::ZERO) {
        return Verdict::Inactive;
    }

    Verdict::Keep(Listing {
        item: item.to_string(),
        store: store.to_string(),
        direction,
        price,
        currency: currency.to_string(),
        quantity: offer.quantity,
        store_balance: balance,
    })
}

/// Remove `<color=...>` markup from a store name.
pub fn clean_store_name(name: &str) -> String {
    COLOR_TAG.replace_all(name, "").trim().to_string()
}
