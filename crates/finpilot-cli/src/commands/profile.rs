use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use finpilot_core::profile::allocation::{
    allocation_drift, recommend_allocation, Allocation, DriftReport,
};
use finpilot_core::profile::scoring::{
    risk_score, IncomeStability, InvestmentExperience, RiskProfile,
};
use finpilot_core::types::PortfolioWeights;

/// Arguments for risk profiling
#[derive(Args)]
pub struct RiskProfileArgs {
    /// Age in years
    #[arg(long)]
    pub age: u32,

    /// Income stability: stable or unstable
    #[arg(long, default_value = "unstable")]
    pub income: String,

    /// Investment experience: low or high
    #[arg(long, default_value = "low")]
    pub experience: String,

    /// Whether an emergency fund is in place
    #[arg(long)]
    pub emergency_fund: bool,

    /// Current equity weight, to report drift against the recommendation
    #[arg(long)]
    pub current_equity: Option<Decimal>,

    /// Current gold weight
    #[arg(long)]
    pub current_gold: Option<Decimal>,

    /// Drift threshold in percentage points
    #[arg(long, default_value = "3")]
    pub drift_threshold: Decimal,
}

#[derive(Debug, Serialize)]
struct ProfileReport {
    risk_score: u8,
    allocation: Allocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    drift: Option<DriftReport>,
}

fn parse_income(income: &str) -> Result<IncomeStability, Box<dyn std::error::Error>> {
    match income.to_lowercase().as_str() {
        "stable" => Ok(IncomeStability::Stable),
        "unstable" => Ok(IncomeStability::Unstable),
        _ => Err(format!("Unknown income stability '{income}'. Use: stable, unstable").into()),
    }
}

fn parse_experience(experience: &str) -> Result<InvestmentExperience, Box<dyn std::error::Error>> {
    match experience.to_lowercase().as_str() {
        "low" => Ok(InvestmentExperience::Low),
        "high" => Ok(InvestmentExperience::High),
        _ => Err(format!("Unknown experience '{experience}'. Use: low, high").into()),
    }
}

/// Assemble a risk profile from CLI flag values.
pub fn build_profile(
    age: u32,
    income: &str,
    experience: &str,
    emergency_fund: bool,
) -> Result<RiskProfile, Box<dyn std::error::Error>> {
    Ok(RiskProfile {
        age,
        income_stability: parse_income(income)?,
        experience: parse_experience(experience)?,
        has_emergency_fund: emergency_fund,
    })
}

pub fn run_risk_profile(args: RiskProfileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = build_profile(args.age, &args.income, &args.experience, args.emergency_fund)?;

    let score = risk_score(&profile);
    let allocation = recommend_allocation(score);

    let drift = match (args.current_equity, args.current_gold) {
        (Some(equity), Some(gold)) => {
            let current = PortfolioWeights::from_equity_gold(equity, gold)?;
            Some(allocation_drift(&current, &allocation, args.drift_threshold)?)
        }
        (None, None) => None,
        _ => return Err("--current-equity and --current-gold must be given together".into()),
    };

    let report = ProfileReport {
        risk_score: score,
        allocation,
        drift,
    };
    Ok(serde_json::to_value(report)?)
}
