mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::advisor::AdviseArgs;
use commands::market::StatsArgs;
use commands::plan::PlanArgs;
use commands::profile::RiskProfileArgs;
use commands::simulate::SimulateArgs;
use commands::sip::SipArgs;

/// Goal-based personal finance planning
#[derive(Parser)]
#[command(
    name = "finpilot",
    version,
    about = "Goal-based personal finance planning",
    long_about = "A CLI for goal-based personal finance planning with decimal precision. \
                  Sizes monthly SIP contributions, profiles risk tolerance into an asset \
                  allocation, computes portfolio return statistics with Sharpe and VaR, \
                  simulates goal achievement, and checks spending feasibility."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Portfolio return statistics with Sharpe ratio and Value-at-Risk
    Stats(StatsArgs),
    /// Size the monthly SIP contribution for a savings goal
    Sip(SipArgs),
    /// Score risk tolerance and recommend an asset allocation
    RiskProfile(RiskProfileArgs),
    /// Monte Carlo goal-achievement simulation
    Simulate(SimulateArgs),
    /// Spend-vs-savings feasibility advice from transaction history
    Advise(AdviseArgs),
    /// Full plan: goal, risk profile, SIP sizing, and simulation
    Plan(PlanArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Stats(args) => commands::market::run_stats(args),
        Commands::Sip(args) => commands::sip::run_sip(args),
        Commands::RiskProfile(args) => commands::profile::run_risk_profile(args),
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Advise(args) => commands::advisor::run_advise(args),
        Commands::Plan(args) => commands::plan::run_plan(args),
        Commands::Version => {
            println!("finpilot {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
