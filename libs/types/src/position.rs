//! Per-asset lending positions
//!
//! Prices change only through the price engine; quantities change only
//! through manual supply/borrow/withdraw/repay actions.

use crate::ids::AssetSymbol;
use crate::numeric::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One asset tracked by a simulation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPosition {
    pub symbol: AssetSymbol,
    /// Wallet balance outside the protocol, available to supply or repay
    pub balance: Decimal,
    pub supplied_qty: Decimal,
    pub borrowed_qty: Decimal,
    pub supply_apy: Decimal,
    pub borrow_apy: Decimal,
    pub price: Price,
    /// Authored stress threshold, not recomputed from live prices
    pub liquidation_price: Option<Price>,
    /// Authored loan-to-value ceiling for the asset, in [0, 1]
    pub ltv: Decimal,
}

impl AssetPosition {
    /// Create a position with nothing supplied or borrowed
    pub fn new(
        symbol: impl Into<AssetSymbol>,
        balance: Decimal,
        price: Price,
        supply_apy: Decimal,
        borrow_apy: Decimal,
        ltv: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            balance,
            supplied_qty: Decimal::ZERO,
            borrowed_qty: Decimal::ZERO,
            supply_apy,
            borrow_apy,
            price,
            liquidation_price: None,
            ltv,
        }
    }

    pub fn with_liquidation_price(mut self, price: Price) -> Self {
        self.liquidation_price = Some(price);
        self
    }

    pub fn with_supplied(mut self, qty: Decimal) -> Self {
        self.supplied_qty = qty;
        self
    }

    pub fn with_borrowed(mut self, qty: Decimal) -> Self {
        self.borrowed_qty = qty;
        self
    }

    /// `supplied_qty × price`, saturating at `Decimal::MAX`
    pub fn supplied_value(&self) -> Decimal {
        self.supplied_qty.saturating_mul(self.price.as_decimal())
    }

    /// `borrowed_qty × price`, saturating at `Decimal::MAX`
    pub fn borrowed_value(&self) -> Decimal {
        self.borrowed_qty.saturating_mul(self.price.as_decimal())
    }

    /// Check quantity invariants: nothing negative, ltv within [0, 1]
    pub fn check_invariant(&self) -> bool {
        self.balance >= Decimal::ZERO
            && self.supplied_qty >= Decimal::ZERO
            && self.borrowed_qty >= Decimal::ZERO
            && self.ltv >= Decimal::ZERO
            && self.ltv <= Decimal::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth() -> AssetPosition {
        AssetPosition::new(
            "ETH",
            Decimal::from_str_exact("2.5").unwrap(),
            Price::from_u64(2000),
            Decimal::from_str_exact("0.032").unwrap(),
            Decimal::from_str_exact("0.045").unwrap(),
            Decimal::from_str_exact("0.80").unwrap(),
        )
    }

    #[test]
    fn test_new_position_empty() {
        let p = eth();
        assert_eq!(p.supplied_qty, Decimal::ZERO);
        assert_eq!(p.borrowed_qty, Decimal::ZERO);
        assert!(p.liquidation_price.is_none());
        assert!(p.check_invariant());
    }

    #[test]
    fn test_values() {
        let p = eth()
            .with_supplied(Decimal::from(2))
            .with_borrowed(Decimal::from_str_exact("0.5").unwrap());
        assert_eq!(p.supplied_value(), Decimal::from(4000));
        assert_eq!(p.borrowed_value(), Decimal::from(1000));
    }

    #[test]
    fn test_values_saturate() {
        let p = eth().with_supplied(Decimal::MAX).with_borrowed(Decimal::MAX);
        assert_eq!(p.supplied_value(), Decimal::MAX);
        assert_eq!(p.borrowed_value(), Decimal::MAX);
    }

    #[test]
    fn test_invariant_rejects_negative() {
        let p = eth().with_borrowed(Decimal::from(-1));
        assert!(!p.check_invariant());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let p = eth().with_liquidation_price(Price::from_u64(1500));
        let json = serde_json::to_string(&p).unwrap();
        let back: AssetPosition = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
