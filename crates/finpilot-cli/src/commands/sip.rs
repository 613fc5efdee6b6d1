use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finpilot_core::sip::size_sip;
use finpilot_core::types::Goal;

use crate::input;

/// Arguments for SIP sizing
#[derive(Args)]
pub struct SipArgs {
    /// Target corpus
    #[arg(long)]
    pub target: Option<Decimal>,

    /// Horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Free-text goal, e.g. "save 10 lakh in 5 years"
    #[arg(long)]
    pub goal: Option<String>,

    /// Expected annual return (0.12 = 12%)
    #[arg(long, default_value = "0.12", allow_hyphen_values = true)]
    pub annual_return: Decimal,
}

/// Resolve a goal from explicit flags or free text. Flags win when both
/// are given.
pub fn resolve_goal(
    target: &Option<Decimal>,
    years: &Option<u32>,
    goal_text: &Option<String>,
) -> Result<Option<Goal>, Box<dyn std::error::Error>> {
    match (target, years) {
        (Some(t), Some(y)) => Ok(Some(Goal::new(*t, *y)?)),
        (Some(_), None) | (None, Some(_)) => {
            Err("--target and --years must be given together".into())
        }
        (None, None) => match goal_text {
            Some(text) => Ok(Some(input::goal_text::parse_goal(text)?)),
            None => Ok(None),
        },
    }
}

pub fn run_sip(args: SipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let goal = resolve_goal(&args.target, &args.years, &args.goal)?
        .ok_or("Provide --target and --years, or --goal \"save 10 lakh in 5 years\"")?;
    let quote = size_sip(&goal, args.annual_return)?;
    Ok(serde_json::to_value(quote)?)
}
