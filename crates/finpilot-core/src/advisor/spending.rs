use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::FinPilotError;
use crate::types::*;
use crate::FinPilotResult;

/// Share of total spending that should be redirected to savings.
pub const DEFAULT_SAVINGS_RATE: Rate = dec!(0.2);

/// A category taking more than this share of spending is flagged.
pub const DEFAULT_CONCENTRATION_THRESHOLD: Rate = dec!(0.3);

fn default_savings_rate() -> Rate {
    DEFAULT_SAVINGS_RATE
}

fn default_concentration_threshold() -> Rate {
    DEFAULT_CONCENTRATION_THRESHOLD
}

/// Input for the spend-vs-savings advisor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingInput {
    /// Categorised transactions for the period under review
    pub transactions: Vec<Transaction>,
    /// The SIP the plan asks the user to fund each month
    pub monthly_sip: Money,
    #[serde(default = "default_savings_rate")]
    pub savings_rate: Rate,
    #[serde(default = "default_concentration_threshold")]
    pub concentration_threshold: Rate,
}

/// Whether the savings target covers the planned SIP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeasibilityVerdict {
    Feasible,
    Insufficient,
}

/// Spending total and share for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub amount: Money,
    /// Fraction of total spending
    pub share: Rate,
}

/// Output of the spend-vs-savings advisor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingOutput {
    pub total_spending: Money,
    /// total_spending x savings_rate, the amount the user could redirect
    pub savings_target: Money,
    pub monthly_sip: Money,
    pub verdict: FeasibilityVerdict,
    /// Gap between the SIP and the savings target when insufficient
    pub shortfall: Money,
    /// Per-category totals, ordered by category name
    pub by_category: Vec<CategorySpend>,
    /// Categories whose share exceeds the concentration threshold
    pub concentrated_categories: Vec<String>,
}

/// Judge whether redirecting a fixed share of observed spending can fund
/// the planned SIP, and flag categories that dominate the spend.
///
/// Transaction amounts are taken by absolute value so debit-negative and
/// debit-positive statement exports behave the same.
pub fn advise_spending(
    input: &SpendingInput,
) -> FinPilotResult<ComputationOutput<SpendingOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.transactions.is_empty() {
        return Err(FinPilotError::InsufficientData(
            "At least one transaction is required for spending advice".into(),
        ));
    }
    if input.savings_rate <= Decimal::ZERO || input.savings_rate > Decimal::ONE {
        return Err(FinPilotError::InvalidInput {
            field: "savings_rate".into(),
            reason: format!("Savings rate must be within (0, 1], got {}", input.savings_rate),
        });
    }
    if input.concentration_threshold <= Decimal::ZERO
        || input.concentration_threshold > Decimal::ONE
    {
        return Err(FinPilotError::InvalidInput {
            field: "concentration_threshold".into(),
            reason: format!(
                "Concentration threshold must be within (0, 1], got {}",
                input.concentration_threshold
            ),
        });
    }
    if input.monthly_sip < Decimal::ZERO {
        return Err(FinPilotError::InvalidInput {
            field: "monthly_sip".into(),
            reason: format!("Monthly SIP must be >= 0, got {}", input.monthly_sip),
        });
    }

    let mut totals: BTreeMap<String, Money> = BTreeMap::new();
    let mut total_spending = Decimal::ZERO;
    for tx in &input.transactions {
        let amount = tx.amount.abs();
        total_spending += amount;
        *totals.entry(tx.category.clone()).or_insert(Decimal::ZERO) += amount;
    }

    if total_spending.is_zero() {
        warnings.push("All transaction amounts are zero; savings target is zero".into());
    }

    let by_category: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, amount)| {
            let share = if total_spending.is_zero() {
                Decimal::ZERO
            } else {
                amount / total_spending
            };
            CategorySpend {
                category,
                amount,
                share,
            }
        })
        .collect();

    let concentrated_categories: Vec<String> = by_category
        .iter()
        .filter(|c| c.share > input.concentration_threshold)
        .map(|c| c.category.clone())
        .collect();
    for category in &concentrated_categories {
        warnings.push(format!(
            "Category '{category}' exceeds {}% of total spending",
            input.concentration_threshold * dec!(100)
        ));
    }

    let savings_target = total_spending * input.savings_rate;
    let (verdict, shortfall) = if savings_target >= input.monthly_sip {
        (FeasibilityVerdict::Feasible, Decimal::ZERO)
    } else {
        (
            FeasibilityVerdict::Insufficient,
            input.monthly_sip - savings_target,
        )
    };

    let output = SpendingOutput {
        total_spending,
        savings_target,
        monthly_sip: input.monthly_sip,
        verdict,
        shortfall,
        by_category,
        concentrated_categories,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Spend-vs-Savings Feasibility (fixed savings rate, category concentration)",
        &serde_json::json!({
            "transactions": input.transactions.len(),
            "savings_rate": input.savings_rate.to_string(),
            "concentration_threshold": input.concentration_threshold.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
