use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finpilot_core::advisor::spending::{advise_spending, SpendingInput};
use finpilot_core::types::Transaction;

use crate::input;

/// Arguments for spending advice
#[derive(Args)]
pub struct AdviseArgs {
    /// Path to a CSV file with description,amount,category rows
    #[arg(long)]
    pub transactions: Option<String>,

    /// Path to a JSON input file with the full advisor input
    #[arg(long)]
    pub input: Option<String>,

    /// Planned monthly SIP contribution
    #[arg(long)]
    pub monthly_sip: Option<Decimal>,

    /// Share of spending treated as redirectable savings
    #[arg(long, default_value = "0.2")]
    pub savings_rate: Decimal,

    /// Category share above which spending is flagged as concentrated
    #[arg(long, default_value = "0.3")]
    pub concentration_threshold: Decimal,
}

pub fn run_advise(args: AdviseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spending_input: SpendingInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else {
        let transactions: Vec<Transaction> = if let Some(ref path) = args.transactions {
            input::transactions::read_csv(path)?
        } else if let Some(data) = input::stdin::read_stdin()? {
            serde_json::from_value(data)?
        } else {
            return Err(
                "Provide --transactions <file.csv>, --input <file.json>, or pipe JSON via stdin"
                    .into(),
            );
        };
        let monthly_sip = args
            .monthly_sip
            .ok_or("--monthly-sip is required with --transactions or stdin input")?;
        SpendingInput {
            transactions,
            monthly_sip,
            savings_rate: args.savings_rate,
            concentration_threshold: args.concentration_threshold,
        }
    };
    let result = advise_spending(&spending_input)?;
    Ok(serde_json::to_value(result)?)
}
