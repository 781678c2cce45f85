//! Mock market source for unit testing.
//!
//! This module provides a source that can be used in tests without making
//! real network requests, plus a builder for store records.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;

use crate::error::FetchError;

use super::types::{OfferRecord, StoreRecord, StoresPayload};
use super::MarketSource;

/// Mock market source for testing.
#[derive(Debug, Clone, Default)]
pub struct MockMarket {
    /// Stores returned by the next fetch.
    stores: Arc<Mutex<Vec<StoreRecord>>>,
    /// Whether fetches fail.
    fail: Arc<AtomicBool>,
    /// Number of fetches performed.
    fetches: Arc<AtomicUsize>,
}

impl MockMarket {
    /// Create a mock serving no stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock serving the given stores.
    pub fn with_stores(stores: Vec<StoreRecord>) -> Self {
        let market = Self::new();
        market.set_stores(stores);
        market
    }

    /// Replace the served stores.
    pub fn set_stores(&self, stores: Vec<StoreRecord>) {
        *self.stores.lock().unwrap_or_else(PoisonError::into_inner) = stores;
    }

    /// Make subsequent fetches fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of fetches performed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl MarketSource for MockMarket {
    async fn fetch_stores(&self) -> Result<StoresPayload, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status { status: 503 });
        }

        Ok(StoresPayload::Wrapped {
            stores: self
                .stores
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        })
    }
}

/// Builder for store records with common patterns.
pub struct MockStoreBuilder {
    store: StoreRecord,
}

impl MockStoreBuilder {
    /// Create an enabled store trading in `currency`.
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            store: StoreRecord {
                name: Some(name.into()),
                balance: None,
                currency_name: Some(currency.into()),
                enabled: Some(true),
                all_offers: Vec::new(),
                malformed: false,
            },
        }
    }

    /// Set the owner's balance.
    pub fn balance(mut self, balance: Decimal) -> Self {
        self.store.balance = Some(balance);
        self
    }

    /// Mark the store closed.
    pub fn disabled(mut self) -> Self {
        self.store.enabled = Some(false);
        self
    }

    /// Add an offer where the store sells `item` at `price`.
    pub fn sells(mut self, item: &str, price: Decimal, quantity: Decimal) -> Self {
        self.store.all_offers.push(OfferRecord {
            item_name: Some(item.to_string()),
            price: Some(price),
            quantity: Some(quantity),
            buying: Some(false),
        });
        self
    }

    /// Add an offer where the store buys `item` at `price`.
    pub fn buys(mut self, item: &str, price: Decimal, quantity: Decimal) -> Self {
        self.store.all_offers.push(OfferRecord {
            item_name: Some(item.to_string()),
            price: Some(price),
            quantity: Some(quantity),
            buying: Some(true),
        });
        self
    }

    /// Add a raw offer record, e.g. a malformed one.
    pub fn offer(mut self, offer: OfferRecord) -> Self {
        self.store.all_offers.push(offer);
        self
    }

    /// Build the store record.
    pub fn build(self) -> StoreRecord {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn mock_market_serves_stores() {
        let market = MockMarket::with_stores(vec![MockStoreBuilder::new("A", "Credits")
            .sells("Wood", dec!(10), dec!(5))
            .build()]);

        let payload = market.fetch_stores().await.unwrap();
        assert_eq!(payload.stores().len(), 1);
        assert_eq!(market.fetch_count(), 1);
    }

    #[tokio::test]
    async fn mock_market_failure_mode() {
        let market = MockMarket::new();
        market.set_failing(true);

        assert!(market.fetch_stores().await.is_err());
        assert_eq!(market.fetch_count(), 1);
    }

    #[test]
    fn mock_store_builder() {
        let store = MockStoreBuilder::new("A", "Credits")
            .balance(dec!(100))
            .sells("Wood", dec!(10), dec!(5))
            .buys("Iron", dec!(20), dec!(2))
            .disabled()
            .build();

        assert_eq!(store.all_offers.len(), 2);
        assert_eq!(store.enabled, Some(false));
        assert_eq!(store.all_offers[0].buying, Some(false));
        assert_eq!(store.all_offers[1].buying, Some(true));
    }
}
