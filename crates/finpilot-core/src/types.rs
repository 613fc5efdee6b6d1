use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinPilotError;
use crate::FinPilotResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Tolerance when checking that portfolio weights sum to 1.
pub const WEIGHT_EPSILON: Decimal = dec!(0.000001);

/// Upper bound on planning horizons, in years.
pub const MAX_HORIZON_YEARS: u32 = 100;

/// A single observation in an asset price history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Money,
}

/// Ordered price history for one asset class. Dates must be strictly
/// increasing; gaps are allowed and dropped during cross-asset alignment.
pub type PriceSeries = Vec<PricePoint>;

/// Equity/gold/debt portfolio weights as fractions summing to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PortfolioWeights {
    pub equity: Rate,
    pub gold: Rate,
    pub debt: Rate,
}

impl PortfolioWeights {
    pub fn new(equity: Rate, gold: Rate, debt: Rate) -> FinPilotResult<Self> {
        let weights = PortfolioWeights { equity, gold, debt };
        weights.validate()?;
        Ok(weights)
    }

    /// Derive the debt weight as the remainder after equity and gold.
    pub fn from_equity_gold(equity: Rate, gold: Rate) -> FinPilotResult<Self> {
        Self::new(equity, gold, Decimal::ONE - equity - gold)
    }

    pub fn validate(&self) -> FinPilotResult<()> {
        for (name, weight) in [
            ("equity", self.equity),
            ("gold", self.gold),
            ("debt", self.debt),
        ] {
            if weight < Decimal::ZERO || weight > Decimal::ONE {
                return Err(FinPilotError::InvalidInput {
                    field: format!("weights.{name}"),
                    reason: format!("Weight must be within [0, 1], got {weight}"),
                });
            }
        }
        let total = self.equity + self.gold + self.debt;
        if (total - Decimal::ONE).abs() > WEIGHT_EPSILON {
            return Err(FinPilotError::InvalidInput {
                field: "weights".into(),
                reason: format!("Weights must sum to 1, got {total}"),
            });
        }
        Ok(())
    }
}

/// A savings goal: target corpus and investment horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub target_amount: Money,
    pub horizon_years: u32,
}

impl Goal {
    pub fn new(target_amount: Money, horizon_years: u32) -> FinPilotResult<Self> {
        let goal = Goal {
            target_amount,
            horizon_years,
        };
        goal.validate()?;
        Ok(goal)
    }

    pub fn validate(&self) -> FinPilotResult<()> {
        if self.target_amount <= Decimal::ZERO {
            return Err(FinPilotError::InvalidGoal {
                field: "target_amount".into(),
                reason: format!("Target amount must be > 0, got {}", self.target_amount),
            });
        }
        if self.horizon_years == 0 {
            return Err(FinPilotError::InvalidGoal {
                field: "horizon_years".into(),
                reason: "Horizon must be at least 1 year".into(),
            });
        }
        if self.horizon_years > MAX_HORIZON_YEARS {
            return Err(FinPilotError::InvalidGoal {
                field: "horizon_years".into(),
                reason: format!(
                    "Horizon of {} years exceeds the {MAX_HORIZON_YEARS}-year limit",
                    self.horizon_years
                ),
            });
        }
        Ok(())
    }
}

/// A categorised spend record, as produced by external bank-statement
/// ingestion. Category strings are open-ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub description: String,
    pub amount: Money,
    pub category: String,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
