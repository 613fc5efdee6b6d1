use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use finpilot_core::market::metrics::{calculate_risk_reward, RiskRewardInput};
use finpilot_core::market::statistics::{
    calculate_return_statistics, ReturnFrequency, ReturnStatisticsInput,
};
use finpilot_core::types::{PortfolioWeights, PriceSeries};
use finpilot_core::FinPilotError;

use crate::input;

/// Per-asset price histories as stored on disk.
#[derive(Debug, Deserialize)]
pub struct PriceHistoryFile {
    pub equity: PriceSeries,
    pub gold: PriceSeries,
    pub debt: PriceSeries,
}

/// Arguments for portfolio return statistics
#[derive(Args)]
pub struct StatsArgs {
    /// Path to a JSON file with equity/gold/debt price histories
    #[arg(long)]
    pub prices: Option<String>,

    /// Equity weight as a fraction (e.g. 0.5)
    #[arg(long, default_value = "0.5")]
    pub equity_weight: Decimal,

    /// Gold weight as a fraction
    #[arg(long, default_value = "0.1")]
    pub gold_weight: Decimal,

    /// Observation frequency: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,

    /// Annualised risk-free rate for the Sharpe ratio
    #[arg(long, default_value = "0.06")]
    pub risk_free_rate: Decimal,

    /// Confidence level for Value-at-Risk (e.g. 0.95 for 95%)
    #[arg(long, default_value = "0.95")]
    pub confidence: Decimal,
}

#[derive(Debug, Serialize)]
struct StatsReport {
    annualised_return: Decimal,
    annualised_volatility: Decimal,
    sharpe_ratio: Option<Decimal>,
    value_at_risk: Option<Decimal>,
    value_at_risk_pct: Option<Decimal>,
    risk_free_rate: Decimal,
    confidence_level: Decimal,
    observations: usize,
    aligned_from: String,
    aligned_to: String,
}

pub fn parse_frequency(frequency: &str) -> Result<ReturnFrequency, Box<dyn std::error::Error>> {
    match frequency.to_lowercase().as_str() {
        "daily" => Ok(ReturnFrequency::Daily),
        "weekly" => Ok(ReturnFrequency::Weekly),
        "monthly" => Ok(ReturnFrequency::Monthly),
        "quarterly" => Ok(ReturnFrequency::Quarterly),
        "annual" | "annually" => Ok(ReturnFrequency::Annual),
        _ => Err(format!(
            "Unknown frequency '{frequency}'. Use: daily, weekly, monthly, quarterly, annual"
        )
        .into()),
    }
}

pub fn load_prices(
    prices_path: &Option<String>,
) -> Result<PriceHistoryFile, Box<dyn std::error::Error>> {
    if let Some(ref path) = prices_path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--prices <file.json> or stdin required for return statistics".into())
    }
}

pub fn run_stats(args: StatsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = load_prices(&args.prices)?;
    let weights = PortfolioWeights::from_equity_gold(args.equity_weight, args.gold_weight)?;

    let stats_input = ReturnStatisticsInput {
        equity: prices.equity,
        gold: prices.gold,
        debt: prices.debt,
        weights,
        frequency: parse_frequency(&args.frequency)?,
    };
    let stats = calculate_return_statistics(&stats_input)?;
    let mut warnings = stats.warnings.clone();

    // A flat series has no defined Sharpe ratio; report statistics anyway
    let metrics_input = RiskRewardInput {
        annualised_return: stats.result.annualised_return,
        annualised_volatility: stats.result.annualised_volatility,
        portfolio_returns: stats.result.portfolio_returns.clone(),
        risk_free_rate: args.risk_free_rate,
        confidence_level: args.confidence,
    };
    let metrics = match calculate_risk_reward(&metrics_input) {
        Ok(m) => Some(m),
        Err(FinPilotError::DegenerateInput(msg)) => {
            warnings.push(msg);
            None
        }
        Err(e) => return Err(e.into()),
    };

    let report = StatsReport {
        annualised_return: stats.result.annualised_return,
        annualised_volatility: stats.result.annualised_volatility,
        sharpe_ratio: metrics.as_ref().map(|m| m.result.sharpe_ratio),
        value_at_risk: metrics.as_ref().map(|m| m.result.value_at_risk),
        value_at_risk_pct: metrics.as_ref().map(|m| m.result.value_at_risk_pct),
        risk_free_rate: args.risk_free_rate,
        confidence_level: args.confidence,
        observations: stats.result.observations,
        aligned_from: stats.result.aligned_from.to_string(),
        aligned_to: stats.result.aligned_to.to_string(),
    };

    Ok(serde_json::json!({
        "result": report,
        "warnings": warnings,
        "methodology": stats.methodology,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frequency_variants() {
        assert!(parse_frequency("Daily").is_ok());
        assert!(parse_frequency("annually").is_ok());
        assert!(parse_frequency("fortnightly").is_err());
    }
}
