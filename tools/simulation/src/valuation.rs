//! Portfolio valuation
//!
//! Derives aggregate and per-asset risk metrics from positions and current
//! prices. Everything here is recomputed from scratch on each call; nothing
//! is updated incrementally.

use rust_decimal::Decimal;
use types::position::AssetPosition;
use types::risk::{AssetRisk, PortfolioSnapshot, RiskBand};

/// Stateless valuator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioValuator;

impl PortfolioValuator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate snapshot:
    ///
    /// ```text
    /// supplied_value = Σ supplied_qty × price
    /// borrowed_value = Σ borrowed_qty × price
    /// net_worth      = supplied_value − borrowed_value
    /// health_factor  = supplied_value / borrowed_value   (NoDebt if borrowed_value == 0)
    /// ```
    pub fn recompute(&self, positions: &[AssetPosition]) -> PortfolioSnapshot {
        let supplied = positions
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.supplied_value()));
        let borrowed = positions
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.borrowed_value()));
        PortfolioSnapshot::from_values(supplied, borrowed)
    }

    /// Per-asset view with LTV and its display band.
    pub fn asset_risk(&self, positions: &[AssetPosition]) -> Vec<AssetRisk> {
        positions.iter().map(asset_risk_for).collect()
    }

    /// Total borrow value permitted by a collateral cap.
    pub fn max_borrow_value(
        &self,
        snapshot: &PortfolioSnapshot,
        collateral_cap: Decimal,
    ) -> Decimal {
        snapshot.supplied_value * collateral_cap
    }

    /// Remaining borrow value before the cap is hit (never negative).
    pub fn borrow_headroom(
        &self,
        snapshot: &PortfolioSnapshot,
        collateral_cap: Decimal,
    ) -> Decimal {
        let max_borrow_value = self.max_borrow_value(snapshot, collateral_cap);
        (max_borrow_value - snapshot.borrowed_value).max(Decimal::ZERO)
    }
}

fn asset_risk_for(position: &AssetPosition) -> AssetRisk {
    let supplied_value = position.supplied_value();
    let borrowed_value = position.borrowed_value();

    let (ltv, band) = if position.borrowed_qty > Decimal::ZERO {
        if supplied_value > Decimal::ZERO {
            let ltv = borrowed_value.checked_div(supplied_value).unwrap_or(Decimal::MAX);
            (Some(ltv), Some(RiskBand::from_ltv(ltv)))
        } else {
            // debt with no collateral in this asset
            (None, Some(RiskBand::High))
        }
    } else {
        (None, None)
    };

    AssetRisk {
        symbol: position.symbol.clone(),
        supplied_value,
        borrowed_value,
        ltv,
        band,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::portfolio::default_positions;
    use proptest::prelude::*;
    use types::numeric::Price;
    use types::risk::HealthFactor;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn position(symbol: &str, price: u64, supplied: &str, borrowed: &str) -> AssetPosition {
        let price = Price::from_u64(price);
        AssetPosition::new(symbol, Decimal::ZERO, price, d("0.03"), d("0.05"), d("0.8"))
            .with_supplied(d(supplied))
            .with_borrowed(d(borrowed))
    }

    #[test]
    fn test_recompute_saturates_instead_of_overflowing() {
        let positions = vec![
            position("ETH", 1, "0", "0").with_supplied(Decimal::MAX),
            position("BTC", 1, "0", "0").with_supplied(Decimal::MAX),
        ];
        let snap = PortfolioValuator::new().recompute(&positions);
        assert_eq!(snap.supplied_value, Decimal::MAX);
        assert!(snap.health_factor.is_no_debt());
    }

    #[test]
    fn test_default_portfolio_has_no_debt() {
        let snap = PortfolioValuator::new().recompute(&default_positions());
        assert_eq!(snap.supplied_value, Decimal::ZERO);
        assert_eq!(snap.borrowed_value, Decimal::ZERO);
        assert_eq!(snap.health_factor, HealthFactor::NoDebt);
    }

    #[test]
    fn test_aggregates() {
        let positions = vec![
            position("ETH", 2000, "2", "0"),
            position("USDC", 1, "1000", "1500"),
        ];
        let snap = PortfolioValuator::new().recompute(&positions);
        assert_eq!(snap.supplied_value, Decimal::from(5000));
        assert_eq!(snap.borrowed_value, Decimal::from(1500));
        assert_eq!(snap.net_worth, Decimal::from(3500));
        let expected = Decimal::from(5000) / Decimal::from(1500);
        assert_eq!(snap.health_factor, HealthFactor::Ratio(expected));
    }

    #[test]
    fn test_asset_risk_bands() {
        let positions = vec![
            position("ETH", 2000, "2", "0.5"),  // ltv 0.25
            position("BTC", 60000, "1", "0.6"), // ltv 0.6
            position("USDC", 1, "100", "80"),   // ltv 0.8
            position("DAI", 1, "0", "50"),      // uncollateralized
            position("WBTC", 60000, "1", "0"),  // no debt
        ];
        let risk = PortfolioValuator::new().asset_risk(&positions);
        assert_eq!(risk[0].ltv, Some(d("0.25")));
        assert_eq!(risk[0].band, Some(RiskBand::Low));
        assert_eq!(risk[1].band, Some(RiskBand::Medium));
        assert_eq!(risk[2].band, Some(RiskBand::High));
        assert_eq!(risk[3].ltv, None);
        assert_eq!(risk[3].band, Some(RiskBand::High));
        assert_eq!(risk[4].ltv, None);
        assert_eq!(risk[4].band, None);
    }

    #[test]
    fn test_max_borrow_and_headroom() {
        let v = PortfolioValuator::new();
        let snap = PortfolioSnapshot::from_values(Decimal::from(1000), Decimal::from(200));
        assert_eq!(v.max_borrow_value(&snap, d("0.67")), Decimal::from(670));
        assert_eq!(v.borrow_headroom(&snap, d("0.67")), Decimal::from(470));

        let over = PortfolioSnapshot::from_values(Decimal::from(100), Decimal::from(200));
        assert_eq!(v.borrow_headroom(&over, d("0.67")), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_health_factor_law(
            supplied in proptest::collection::vec(0u32..10_000, 1..6),
            borrowed in proptest::collection::vec(0u32..10_000, 1..6),
            price in 1u64..100_000,
        ) {
            let positions: Vec<AssetPosition> = supplied
                .iter()
                .zip(borrowed.iter())
                .enumerate()
                .map(|(i, (s, b))| {
                    AssetPosition::new(
                        format!("A{}", i).as_str(),
                        Decimal::ZERO,
                        Price::from_u64(price + i as u64),
                        Decimal::ZERO,
                        Decimal::ZERO,
                        d("0.8"),
                    )
                    .with_supplied(Decimal::from(*s))
                    .with_borrowed(Decimal::from(*b))
                })
                .collect();
            let snap = PortfolioValuator::new().recompute(&positions);
            prop_assert_eq!(snap.net_worth, snap.supplied_value - snap.borrowed_value);
            if snap.borrowed_value == Decimal::ZERO {
                prop_assert_eq!(snap.health_factor, HealthFactor::NoDebt);
            } else {
                prop_assert_eq!(
                    snap.health_factor,
                    HealthFactor::Ratio(snap.supplied_value / snap.borrowed_value)
                );
            }
        }
    }
}
