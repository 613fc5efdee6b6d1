use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinPilotError;
use crate::types::*;
use crate::FinPilotResult;

/// Annualised risk-free rate used when the caller does not supply one.
pub const DEFAULT_RISK_FREE_RATE: Rate = dec!(0.06);

/// Default confidence level for Value-at-Risk.
pub const DEFAULT_VAR_CONFIDENCE: Rate = dec!(0.95);

fn default_risk_free_rate() -> Rate {
    DEFAULT_RISK_FREE_RATE
}

fn default_confidence_level() -> Rate {
    DEFAULT_VAR_CONFIDENCE
}

/// Input for risk/reward metrics over a portfolio return series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRewardInput {
    pub annualised_return: Rate,
    pub annualised_volatility: Rate,
    /// Periodic portfolio returns for the historical VaR percentile
    pub portfolio_returns: Vec<Rate>,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: Rate,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: Rate,
}

/// Output of risk/reward metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRewardOutput {
    pub sharpe_ratio: Decimal,
    /// Periodic return at the (1 - confidence) percentile; negative is a loss
    pub value_at_risk: Rate,
    /// The same threshold expressed in percent
    pub value_at_risk_pct: Rate,
    pub mean_periodic_return: Rate,
    pub risk_free_rate: Rate,
    pub confidence_level: Rate,
    pub observations: usize,
}

/// Calculate Sharpe ratio and historical Value-at-Risk for a portfolio
/// return series.
pub fn calculate_risk_reward(
    input: &RiskRewardInput,
) -> FinPilotResult<ComputationOutput<RiskRewardOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let n = input.portfolio_returns.len();
    if n < 2 {
        return Err(FinPilotError::InsufficientData(
            "At least 2 return observations required for risk/reward metrics".into(),
        ));
    }
    if input.confidence_level <= Decimal::ZERO || input.confidence_level >= Decimal::ONE {
        return Err(FinPilotError::InvalidInput {
            field: "confidence_level".into(),
            reason: "Confidence level must be between 0 and 1 (exclusive)".into(),
        });
    }

    let sharpe = sharpe_ratio(
        input.annualised_return,
        input.annualised_volatility,
        input.risk_free_rate,
    )?;

    let tail_pct = (Decimal::ONE - input.confidence_level) * dec!(100);
    let value_at_risk = percentile(&input.portfolio_returns, tail_pct)?;

    let mean_periodic_return =
        input.portfolio_returns.iter().sum::<Decimal>() / Decimal::from(n as i64);

    let output = RiskRewardOutput {
        sharpe_ratio: sharpe,
        value_at_risk,
        value_at_risk_pct: value_at_risk * dec!(100),
        mean_periodic_return,
        risk_free_rate: input.risk_free_rate,
        confidence_level: input.confidence_level,
        observations: n,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Risk/Reward Metrics (Sharpe ratio, historical VaR with linear interpolation)",
        &serde_json::json!({
            "observations": n,
            "risk_free_rate": input.risk_free_rate.to_string(),
            "confidence_level": input.confidence_level.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Excess return per unit of volatility. Zero volatility has no defined
/// Sharpe ratio and is rejected rather than propagated as NaN or infinity.
pub fn sharpe_ratio(
    annualised_return: Rate,
    annualised_volatility: Rate,
    risk_free_rate: Rate,
) -> FinPilotResult<Decimal> {
    if annualised_volatility < Decimal::ZERO {
        return Err(FinPilotError::InvalidInput {
            field: "annualised_volatility".into(),
            reason: format!("Volatility must be >= 0, got {annualised_volatility}"),
        });
    }
    if annualised_volatility.is_zero() {
        return Err(FinPilotError::DegenerateInput(format!(
            "Sharpe ratio is undefined at zero volatility (annualised return {annualised_return})"
        )));
    }
    Ok((annualised_return - risk_free_rate) / annualised_volatility)
}

/// Percentile of a return series by linear interpolation between order
/// statistics: rank = p/100 x (n-1) on the ascending sort.
pub fn percentile(returns: &[Rate], p: Decimal) -> FinPilotResult<Rate> {
    if returns.is_empty() {
        return Err(FinPilotError::InsufficientData(
            "Percentile of an empty series".into(),
        ));
    }
    if p < Decimal::ZERO || p > dec!(100) {
        return Err(FinPilotError::InvalidInput {
            field: "percentile".into(),
            reason: format!("Percentile must be within [0, 100], got {p}"),
        });
    }

    let mut sorted = returns.to_vec();
    sorted.sort();
    if sorted.len() == 1 {
        return Ok(sorted[0]);
    }

    let rank = p / dec!(100) * Decimal::from((sorted.len() - 1) as i64);
    let lower = rank.floor().to_usize().unwrap_or(0).min(sorted.len() - 1);
    let frac = rank - rank.floor();
    if frac.is_zero() || lower + 1 >= sorted.len() {
        return Ok(sorted[lower]);
    }
    Ok(sorted[lower] * (Decimal::ONE - frac) + sorted[lower + 1] * frac)
}
