use clap::Args;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use finpilot_core::market::statistics::{calculate_return_statistics, ReturnStatisticsInput};
use finpilot_core::monte_carlo::goal::{run_goal_simulation, GoalSimulationInput};
use finpilot_core::profile::allocation::{recommend_allocation, Allocation};
use finpilot_core::profile::scoring::risk_score;
use finpilot_core::sip::{size_sip, SipQuote};
use finpilot_core::types::Goal;
use finpilot_core::FinPilotError;

use super::market::{load_prices, parse_frequency};
use super::profile::build_profile;
use crate::input;

/// Arguments for the full planning pipeline
#[derive(Args)]
pub struct PlanArgs {
    /// Target corpus
    #[arg(long)]
    pub target: Option<Decimal>,

    /// Horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Free-text goal, e.g. "save 10 lakh in 5 years"
    #[arg(long)]
    pub goal: Option<String>,

    /// Fallback target when no goal is given or the text is unparseable
    #[arg(long, default_value = "1000000")]
    pub default_target: Decimal,

    /// Fallback horizon in years
    #[arg(long, default_value = "5")]
    pub default_years: u32,

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

    /// Expected annual return, used when no price file is given
    #[arg(long, default_value = "0.12", allow_hyphen_values = true)]
    pub annual_return: Decimal,

    /// Annual return volatility for the simulation
    #[arg(long, default_value = "0.15")]
    pub volatility: Decimal,

    /// Path to a JSON file with equity/gold/debt price histories; return
    /// and volatility are then estimated under the recommended allocation
    #[arg(long)]
    pub prices: Option<String>,

    /// Observation frequency of the price histories
    #[arg(long, default_value = "daily")]
    pub frequency: String,

    /// Skip the Monte Carlo simulation step
    #[arg(long)]
    pub no_simulation: bool,

    /// Number of simulation paths
    #[arg(long, default_value = "1000")]
    pub simulations: u32,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PlanReport {
    target_amount: Decimal,
    horizon_years: u32,
    risk_score: u8,
    allocation: Allocation,
    annual_return: Decimal,
    volatility: Decimal,
    monthly_contribution: Decimal,
    total_invested: Decimal,
    expected_gain: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal_probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    median_final_value: Option<f64>,
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut warnings: Vec<String> = Vec::new();

    let goal = resolve_plan_goal(&args, &mut warnings)?;

    let profile = build_profile(args.age, &args.income, &args.experience, args.emergency_fund)?;
    let score = risk_score(&profile);
    let allocation = recommend_allocation(score);

    // Return assumptions: estimated from price histories under the
    // recommended allocation when available, otherwise the flags
    let (annual_return, volatility) = if args.prices.is_some() {
        let prices = load_prices(&args.prices)?;
        let stats = calculate_return_statistics(&ReturnStatisticsInput {
            equity: prices.equity,
            gold: prices.gold,
            debt: prices.debt,
            weights: allocation.weights(),
            frequency: parse_frequency(&args.frequency)?,
        })?;
        warnings.extend(stats.warnings);
        (
            stats.result.annualised_return,
            stats.result.annualised_volatility,
        )
    } else {
        (args.annual_return, args.volatility)
    };

    let quote: SipQuote = size_sip(&goal, annual_return)?;

    let simulation = if args.no_simulation {
        None
    } else {
        let sim_input = GoalSimulationInput {
            annual_return: to_f64(annual_return, "annual_return")?,
            volatility: to_f64(volatility, "volatility")?,
            monthly_sip: to_f64(quote.monthly_contribution, "monthly_contribution")?,
            horizon_years: goal.horizon_years,
            target_amount: to_f64(goal.target_amount, "target_amount")?,
            num_simulations: args.simulations,
            seed: args.seed,
        };
        let result = run_goal_simulation(&sim_input)?;
        warnings.extend(result.warnings);
        Some(result.result)
    };

    let report = PlanReport {
        target_amount: goal.target_amount,
        horizon_years: goal.horizon_years,
        risk_score: score,
        allocation,
        annual_return,
        volatility,
        monthly_contribution: quote.monthly_contribution,
        total_invested: quote.total_invested,
        expected_gain: quote.expected_gain,
        goal_probability: simulation.as_ref().map(|s| s.goal_probability),
        median_final_value: simulation.as_ref().map(|s| s.median_final_value),
    };

    Ok(serde_json::json!({
        "result": report,
        "warnings": warnings,
        "methodology": "Goal Plan (risk-scored allocation, annuity-due SIP sizing, Monte Carlo goal odds)",
    }))
}

/// Goal from explicit flags, then free text, then the configured default.
/// An unparseable goal text degrades to the default with a warning rather
/// than failing the whole plan.
fn resolve_plan_goal(
    args: &PlanArgs,
    warnings: &mut Vec<String>,
) -> Result<Goal, Box<dyn std::error::Error>> {
    match (&args.target, &args.years) {
        (Some(t), Some(y)) => return Ok(Goal::new(*t, *y)?),
        (Some(_), None) | (None, Some(_)) => {
            return Err("--target and --years must be given together".into())
        }
        (None, None) => {}
    }
    if let Some(ref text) = args.goal {
        match input::goal_text::parse_goal(text) {
            Ok(goal) => return Ok(goal),
            Err(FinPilotError::UnparseableGoal(msg)) => warnings.push(format!(
                "{msg}; assuming {} over {} years",
                args.default_target, args.default_years
            )),
            Err(e) => return Err(e.into()),
        }
    } else {
        warnings.push(format!(
            "No goal given; assuming {} over {} years",
            args.default_target, args.default_years
        ));
    }
    Ok(Goal::new(args.default_target, args.default_years)?)
}

fn to_f64(value: Decimal, field: &str) -> Result<f64, Box<dyn std::error::Error>> {
    value
        .to_f64()
        .ok_or_else(|| format!("Cannot represent {field} = {value} as f64").into())
}
