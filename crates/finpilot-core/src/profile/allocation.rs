use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{PortfolioWeights, Rate};
use crate::FinPilotResult;

/// Recommended asset split as whole percentages summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub equity_pct: u8,
    pub debt_pct: u8,
    pub gold_pct: u8,
}

impl Allocation {
    pub fn total(&self) -> u16 {
        self.equity_pct as u16 + self.debt_pct as u16 + self.gold_pct as u16
    }

    /// Fractional weights for the statistics and simulation engines.
    pub fn weights(&self) -> PortfolioWeights {
        PortfolioWeights {
            equity: Decimal::from(self.equity_pct) / dec!(100),
            gold: Decimal::from(self.gold_pct) / dec!(100),
            debt: Decimal::from(self.debt_pct) / dec!(100),
        }
    }
}

/// Map a risk score to one of three fixed allocation tiers.
///
/// Comparisons are strict: a score of exactly 70 lands in the middle tier
/// and exactly 40 in the bottom tier.
pub fn recommend_allocation(score: u8) -> Allocation {
    if score > 70 {
        Allocation {
            equity_pct: 70,
            debt_pct: 20,
            gold_pct: 10,
        }
    } else if score > 40 {
        Allocation {
            equity_pct: 50,
            debt_pct: 40,
            gold_pct: 10,
        }
    } else {
        Allocation {
            equity_pct: 30,
            debt_pct: 60,
            gold_pct: 10,
        }
    }
}

/// Default rebalancing trigger, in percentage points.
pub const DEFAULT_DRIFT_THRESHOLD_PCT: Decimal = dec!(3);

/// Measured deviation of the current weights from a target allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub equity_drift_pct: Rate,
    pub gold_drift_pct: Rate,
    pub debt_drift_pct: Rate,
    pub max_drift_pct: Rate,
    pub threshold_pct: Rate,
    pub rebalancing_recommended: bool,
}

/// Allocation drift: per-asset |current - target| in percentage points,
/// with a rebalancing recommendation when the largest deviation exceeds
/// the threshold.
pub fn allocation_drift(
    current: &PortfolioWeights,
    target: &Allocation,
    threshold_pct: Rate,
) -> FinPilotResult<DriftReport> {
    current.validate()?;

    let hundred = dec!(100);
    let equity_drift_pct = (current.equity * hundred - Decimal::from(target.equity_pct)).abs();
    let gold_drift_pct = (current.gold * hundred - Decimal::from(target.gold_pct)).abs();
    let debt_drift_pct = (current.debt * hundred - Decimal::from(target.debt_pct)).abs();
    let max_drift_pct = equity_drift_pct.max(gold_drift_pct).max(debt_drift_pct);

    Ok(DriftReport {
        equity_drift_pct,
        gold_drift_pct,
        debt_drift_pct,
        max_drift_pct,
        threshold_pct,
        rebalancing_recommended: max_drift_pct > threshold_pct,
    })
}
