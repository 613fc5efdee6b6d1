use clap::Args;
use serde_json::Value;

use finpilot_core::monte_carlo::goal::{run_goal_simulation, GoalSimulationInput};

use crate::input;

/// Arguments for goal-achievement simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON input file (overrides the flags below)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly SIP contribution
    #[arg(long)]
    pub monthly_sip: Option<f64>,

    /// Target corpus
    #[arg(long)]
    pub target: Option<f64>,

    /// Horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Expected annual return (0.12 = 12%)
    #[arg(long, default_value = "0.12", allow_hyphen_values = true)]
    pub annual_return: f64,

    /// Annual return volatility
    #[arg(long, default_value = "0.15")]
    pub volatility: f64,

    /// Number of simulation paths
    #[arg(long, default_value = "1000")]
    pub simulations: u32,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: GoalSimulationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let (monthly_sip, target, years) = match (args.monthly_sip, args.target, args.years) {
            (Some(s), Some(t), Some(y)) => (s, t, y),
            _ => {
                return Err(
                    "Provide --monthly-sip, --target and --years, or --input <file.json>, \
                     or pipe JSON via stdin"
                        .into(),
                )
            }
        };
        GoalSimulationInput {
            annual_return: args.annual_return,
            volatility: args.volatility,
            monthly_sip,
            horizon_years: years,
            target_amount: target,
            num_simulations: args.simulations,
            seed: args.seed,
        }
    };
    let result = run_goal_simulation(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}
