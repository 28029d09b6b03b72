//! Portfolio risk types
//!
//! Snapshot, health factor and the display-only classification bands.

use crate::ids::AssetSymbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Health factor of a portfolio
///
/// `NoDebt` is the sentinel for `borrowed_value == 0`; otherwise the ratio
/// is exactly `supplied_value / borrowed_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum HealthFactor {
    NoDebt,
    Ratio(Decimal),
}

impl HealthFactor {
    /// Derive from aggregate values. A ratio too large for `Decimal`
    /// saturates at `Decimal::MAX`.
    pub fn from_values(supplied_value: Decimal, borrowed_value: Decimal) -> Self {
        if borrowed_value > Decimal::ZERO {
            HealthFactor::Ratio(supplied_value.checked_div(borrowed_value).unwrap_or(Decimal::MAX))
        } else {
            HealthFactor::NoDebt
        }
    }

    pub fn ratio(&self) -> Option<Decimal> {
        match self {
            HealthFactor::NoDebt => None,
            HealthFactor::Ratio(r) => Some(*r),
        }
    }

    pub fn is_no_debt(&self) -> bool {
        matches!(self, HealthFactor::NoDebt)
    }
}

/// Derived portfolio aggregates, recomputed every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub supplied_value: Decimal,
    pub borrowed_value: Decimal,
    pub net_worth: Decimal,
    pub health_factor: HealthFactor,
}

impl PortfolioSnapshot {
    /// Build a snapshot from aggregate values
    pub fn from_values(supplied_value: Decimal, borrowed_value: Decimal) -> Self {
        Self {
            supplied_value,
            borrowed_value,
            net_worth: supplied_value.saturating_sub(borrowed_value),
            health_factor: HealthFactor::from_values(supplied_value, borrowed_value),
        }
    }

    pub fn empty() -> Self {
        Self::from_values(Decimal::ZERO, Decimal::ZERO)
    }
}

impl Default for PortfolioSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Per-asset LTV band (display only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    /// ltv < 0.5
    Low,
    /// 0.5 <= ltv < 0.7
    Medium,
    /// ltv >= 0.7
    High,
}

impl RiskBand {
    pub fn from_ltv(ltv: Decimal) -> Self {
        let medium = Decimal::new(5, 1);
        let high = Decimal::new(7, 1);
        if ltv < medium {
            RiskBand::Low
        } else if ltv < high {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }
}

/// Per-asset risk view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRisk {
    pub symbol: AssetSymbol,
    pub supplied_value: Decimal,
    pub borrowed_value: Decimal,
    /// Present only when the asset has both debt and supplied quantity
    pub ltv: Option<Decimal>,
    /// Present only when the asset has debt
    pub band: Option<RiskBand>,
}

/// Portfolio-level health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    /// No outstanding debt
    NoDebt,
    /// health_factor >= 2.0
    Safe,
    /// 1.5 <= health_factor < 2.0
    Moderate,
    /// 1.0 <= health_factor < 1.5
    Danger,
    /// health_factor < 1.0
    Liquidatable,
}

impl HealthLevel {
    pub fn classify(health_factor: HealthFactor) -> Self {
        let ratio = match health_factor {
            HealthFactor::NoDebt => return HealthLevel::NoDebt,
            HealthFactor::Ratio(r) => r,
        };
        if ratio < Decimal::ONE {
            HealthLevel::Liquidatable
        } else if ratio < Decimal::new(15, 1) {
            HealthLevel::Danger
        } else if ratio < Decimal::TWO {
            HealthLevel::Moderate
        } else {
            HealthLevel::Safe
        }
    }

    /// Whether the learner should be warned about this level.
    pub fn is_at_risk(&self) -> bool {
        matches!(self, HealthLevel::Danger | HealthLevel::Liquidatable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_factor_no_debt() {
        let hf = HealthFactor::from_values(Decimal::from(1000), Decimal::ZERO);
        assert_eq!(hf, HealthFactor::NoDebt);
        assert!(hf.ratio().is_none());
    }

    #[test]
    fn test_health_factor_ratio() {
        let hf = HealthFactor::from_values(Decimal::from(1000), Decimal::from(400));
        assert_eq!(hf.ratio(), Some(Decimal::new(25, 1)));
    }

    #[test]
    fn test_health_factor_saturates() {
        let tiny = Decimal::new(1, 16);
        let hf = HealthFactor::from_values(Decimal::MAX, tiny);
        assert_eq!(hf, HealthFactor::Ratio(Decimal::MAX));
        let s = PortfolioSnapshot::from_values(Decimal::MAX, tiny);
        assert!(s.net_worth > Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_net_worth() {
        let s = PortfolioSnapshot::from_values(Decimal::from(1000), Decimal::from(250));
        assert_eq!(s.net_worth, Decimal::from(750));
        assert_eq!(s.health_factor, HealthFactor::Ratio(Decimal::from(4)));
    }

    #[test]
    fn test_empty_snapshot() {
        let s = PortfolioSnapshot::default();
        assert_eq!(s.net_worth, Decimal::ZERO);
        assert!(s.health_factor.is_no_debt());
    }

    #[test]
    fn test_risk_band_edges() {
        assert_eq!(RiskBand::from_ltv(Decimal::new(49, 2)), RiskBand::Low);
        assert_eq!(RiskBand::from_ltv(Decimal::new(5, 1)), RiskBand::Medium);
        assert_eq!(RiskBand::from_ltv(Decimal::new(69, 2)), RiskBand::Medium);
        assert_eq!(RiskBand::from_ltv(Decimal::new(7, 1)), RiskBand::High);
    }

    #[test]
    fn test_health_level_classify() {
        assert_eq!(HealthLevel::classify(HealthFactor::NoDebt), HealthLevel::NoDebt);
        assert_eq!(HealthLevel::classify(HealthFactor::Ratio(Decimal::from(3))), HealthLevel::Safe);
        let level = |r: i64| HealthLevel::classify(HealthFactor::Ratio(Decimal::new(r, 1)));
        assert_eq!(level(17), HealthLevel::Moderate);
        assert_eq!(level(12), HealthLevel::Danger);
        assert_eq!(level(9), HealthLevel::Liquidatable);
        assert!(HealthLevel::Danger.is_at_risk());
        assert!(!HealthLevel::Moderate.is_at_risk());
    }

    #[test]
    fn test_health_level_ordering() {
        assert!(HealthLevel::Liquidatable > HealthLevel::Danger);
        assert!(HealthLevel::Safe > HealthLevel::NoDebt);
    }

    #[test]
    fn test_health_factor_json() {
        let json = serde_json::to_value(HealthFactor::NoDebt).unwrap();
        assert_eq!(json["kind"], "noDebt");
    }
}
