//! Buckets for the detailed analysis view.

use rust_decimal::Decimal;

use super::calculator::Opportunity;

/// Total profit needed for the high-profit bucket.
pub const HIGH_PROFIT_TOTAL: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
/// Margin percentage needed for the high-ROI bucket.
pub const HIGH_ROI_PCT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
/// Largest investment that still counts as low risk.
pub const LOW_RISK_MAX_INVESTMENT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
/// Smallest total profit worth a low-risk trade.
pub const LOW_RISK_MIN_PROFIT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Trade size that counts as bulk.
pub const BULK_QUANTITY: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Opportunities grouped by trading profile. One opportunity can appear in
/// several buckets; each bucket keeps the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories {
    /// Total profit of at least 50.
    pub high_profit: Vec<Opportunity>,
    /// Margin of at least 50%.
    pub high_roi: Vec<Opportunity>,
    /// Investment of at most 20 returning at least 5.
    pub low_risk: Vec<Opportunity>,
    /// At least 100 units tradeable.
    pub bulk: Vec<Opportunity>,
    /// Items given away at the source store.
    pub free: Vec<Opportunity>,
}

/// Sort opportunities into buckets.
pub fn categorize(opportunities: &[Opportunity]) -> Categories {
    let mut categories = Categories::default();

    for opp in opportunities {
        let total = opp.total_profit();

        if total.is_some_and(|t| t >= HIGH_PROFIT_TOTAL) {
            categories.high_profit.push(opp.clone());
        }
        if opp.margin_pct().is_some_and(|m| m >= HIGH_ROI_PCT) {
            categories.high_roi.push(opp.clone());
        }
        if let (Some(investment), Some(total)) = (opp.investment(), total) {
            if investment <= LOW_RISK_MAX_INVESTMENT && total >= LOW_RISK_MIN_PROFIT {
                categories.low_risk.push(opp.clone());
            }
        }
        if opp.max_trade_quantity().is_some_and(|q| q >= BULK_QUANTITY) {
            categories.bulk.push(opp.clone());
        }
        if opp.is_free() {
            categories.free.push(opp.clone());
        }
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::calculate_opportunity;
    use crate::market::{Direction, Listing};
    use rust_decimal_macros::dec;

    fn opp(buy: Decimal, sell: Decimal, qty: Option<Decimal>) -> Opportunity {
        let mut source = Listing::new("Wood", "A", Direction::Sell, buy, "Credits");
        let mut dest = Listing::new("Wood", "B", Direction::Buy, sell, "Credits");
        source.quantity = qty;
        dest.quantity = qty;
        calculate_opportunity(&source, &dest, dec!(50)).unwrap()
    }

    #[test]
    fn buckets_by_profile() {
        // total 10 * 200 = 2000, margin 100%, investment 2000, bulk
        let big = opp(dec!(10), dec!(20), Some(dec!(200)));
        // total 2 * 5 = 10, margin 200%, investment 5
        let small = opp(dec!(1), dec!(3), Some(dec!(5)));
        // margin 10%, no quantity
        let thin = opp(dec!(100), dec!(110), None);
        let free = opp(dec!(0), dec!(4), Some(dec!(3)));

        let cats = categorize(&[big.clone(), small.clone(), thin, free.clone()]);

        assert_eq!(cats.high_profit, vec![big.clone()]);
        assert_eq!(cats.high_roi, vec![big.clone(), small.clone()]);
        assert_eq!(cats.low_risk, vec![small, free.clone()]);
        assert_eq!(cats.bulk, vec![big]);
        assert_eq!(cats.free, vec![free]);
    }

    #[test]
    fn empty_input_gives_empty_buckets() {
        assert_eq!(categorize(&[]), Categories::default());
    }
}
