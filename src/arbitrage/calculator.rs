//! Profit and sizing calculations for a single buy/sell pairing.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::market::{Direction, Listing};

/// Buy at one store, sell at another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opportunity {
    /// Item traded.
    pub item: String,
    /// Store selling the item (where we buy).
    pub source_store: String,
    /// Store buying the item (where we sell).
    pub destination_store: String,
    /// Currency of both legs.
    pub currency: String,
    /// Price paid at the source store.
    pub buy_price: Decimal,
    /// Price received at the destination store.
    pub sell_price: Decimal,
    /// Per-unit profit (sell_price - buy_price).
    pub profit: Decimal,
    /// Units the source store has in stock.
    pub buy_quantity: Option<Decimal>,
    /// Units the destination store wants.
    pub sell_quantity: Option<Decimal>,
    /// Source store owner's balance.
    pub source_balance: Option<Decimal>,
    /// Destination store owner's balance.
    pub destination_balance: Option<Decimal>,
    /// Source balance would drop below the liquidity margin.
    pub low_liquidity: bool,
}

impl Opportunity {
    /// Largest trade both sides can fill, when both quantities are known.
    pub fn max_trade_quantity(&self) -> Option<Decimal> {
        match (self.buy_quantity, self.sell_quantity) {
            (Some(buy), Some(sell)) => Some(buy.min(sell)),
            _ => None,
        }
    }

    /// Profit for the full tradeable quantity. None if unknown or out of range.
    pub fn total_profit(&self) -> Option<Decimal> {
        self.max_trade_quantity()?.checked_mul(self.profit)
    }

    /// Profit as a percentage of the buy price. None for free items.
    pub fn margin_pct(&self) -> Option<Decimal> {
        if self.buy_price.is_zero() {
            return None;
        }
        self.profit
            .checked_div(self.buy_price)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Cost of buying the full tradeable quantity.
    pub fn investment(&self) -> Option<Decimal> {
        self.max_trade_quantity()?.checked_mul(self.buy_price)
    }

    /// Source balance left after the investment.
    pub fn remaining_balance(&self) -> Option<Decimal> {
        self.source_balance?.checked_sub(self.investment()?)
    }

    /// Item is given away at the source store.
    pub fn is_free(&self) -> bool {
        self.buy_price.is_zero()
    }
}

/// Pair a sell offer with a buy offer.
///
/// Returns `None` unless the listings are on opposite sides of the same
/// item and currency at different stores with strictly positive profit.
pub fn calculate_opportunity(
    sell_offer: &Listing,
    buy_offer: &Listing,
    liquidity_margin: Decimal,
) -> Option<Opportunity> {
    if sell_offer.direction != Direction::Sell || buy_offer.direction != Direction::Buy {
        return None;
    }
    if sell_offer.store == buy_offer.store
        || sell_offer.item != buy_offer.item
        || sell_offer.currency != buy_offer.currency
    {
        return None;
    }

    let profit = buy_offer.price - sell_offer.price;
    if profit <= Decimal::ZERO {
        return None;
    }

    let mut opportunity = Opportunity {
        item: sell_offer.item.clone(),
        source_store: sell_offer.store.clone(),
        destination_store: buy_offer.store.clone(),
        currency: sell_offer.currency.clone(),
        buy_price: sell_offer.price,
        sell_price: buy_offer.price,
        profit,
        buy_quantity: sell_offer.quantity,
        sell_quantity: buy_offer.quantity,
        source_balance: sell_offer.store_balance,
        destination_balance: buy_offer.store_balance,
        low_liquidity: false,
    };
    opportunity.low_liquidity = opportunity
        .remaining_balance()
        .is_some_and(|remaining| remaining < liquidity_margin);

    Some(opportunity)
}
