//! Default starting portfolio
//!
//! Every session starts (and every reset returns) to this set of positions.
//! Quantities, APYs and prices are authored demo values.

use rust_decimal::Decimal;
use std::collections::HashSet;
use types::errors::CatalogError;
use types::numeric::Price;
use types::position::AssetPosition;

/// Ordered list of positions a session starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct StartingPortfolio {
    positions: Vec<AssetPosition>,
}

impl StartingPortfolio {
    /// Validate and wrap a list of positions.
    pub fn new(positions: Vec<AssetPosition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for p in &positions {
            if !seen.insert(p.symbol.clone()) {
                return Err(CatalogError::InvalidPortfolio {
                    reason: format!("duplicate asset {}", p.symbol),
                });
            }
            if !p.check_invariant() {
                return Err(CatalogError::InvalidPortfolio {
                    reason: format!(
                        "asset {} has negative quantities or ltv outside [0, 1]",
                        p.symbol
                    ),
                });
            }
        }
        Ok(Self { positions })
    }

    /// Load from a JSON array of positions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let positions: Vec<AssetPosition> = serde_json::from_str(json)?;
        Self::new(positions)
    }

    /// Fresh copy of the positions.
    pub fn positions(&self) -> Vec<AssetPosition> {
        self.positions.clone()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for StartingPortfolio {
    fn default() -> Self {
        Self {
            positions: default_positions(),
        }
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap_or(Decimal::ZERO)
}

/// The demo wallet: ETH, BTC, USDC and DAI, nothing supplied yet.
pub fn default_positions() -> Vec<AssetPosition> {
    vec![
        AssetPosition::new(
            "ETH",
            dec("2.5"),
            Price::from_u64(3_200),
            dec("0.032"),
            dec("0.045"),
            dec("0.80"),
        )
        .with_liquidation_price(Price::from_u64(2_400)),
        AssetPosition::new(
            "BTC",
            dec("0.15"),
            Price::from_u64(64_000),
            dec("0.012"),
            dec("0.028"),
            dec("0.75"),
        )
        .with_liquidation_price(Price::from_u64(48_000)),
        AssetPosition::new(
            "USDC",
            dec("5000"),
            Price::from_u64(1),
            dec("0.051"),
            dec("0.068"),
            dec("0.85"),
        ),
        AssetPosition::new(
            "DAI",
            dec("2500"),
            Price::from_u64(1),
            dec("0.047"),
            dec("0.063"),
            dec("0.77"),
        ),
    ]
}
