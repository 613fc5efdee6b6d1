use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::FinPilotError;
use crate::types::*;
use crate::FinPilotResult;

/// Frequency of price observations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ReturnFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ReturnFrequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            ReturnFrequency::Daily => dec!(252),
            ReturnFrequency::Weekly => dec!(52),
            ReturnFrequency::Monthly => dec!(12),
            ReturnFrequency::Quarterly => dec!(4),
            ReturnFrequency::Annual => dec!(1),
        }
    }
}

/// Input for portfolio return statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStatisticsInput {
    pub equity: PriceSeries,
    pub gold: PriceSeries,
    pub debt: PriceSeries,
    pub weights: PortfolioWeights,
    /// Observation frequency of the price histories
    pub frequency: ReturnFrequency,
}

/// Output of portfolio return statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStatisticsOutput {
    pub annualised_return: Rate,
    pub annualised_volatility: Rate,
    /// Weighted periodic portfolio returns over the aligned window
    pub portfolio_returns: Vec<Rate>,
    /// Number of aligned price observations (returns are one fewer)
    pub observations: usize,
    pub aligned_from: NaiveDate,
    pub aligned_to: NaiveDate,
}

/// Calculate annualised return and volatility for a weighted three-asset
/// portfolio from its per-asset price histories.
///
/// The histories are inner-joined on date; any date missing from any series
/// is dropped before differencing. Zero volatility is a valid result (the
/// ratio-based metrics downstream reject it explicitly).
pub fn calculate_return_statistics(
    input: &ReturnStatisticsInput,
) -> FinPilotResult<ComputationOutput<ReturnStatisticsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.weights.validate()?;
    validate_series("equity", &input.equity)?;
    validate_series("gold", &input.gold)?;
    validate_series("debt", &input.debt)?;

    let aligned = align_series(&input.equity, &input.gold, &input.debt);
    let n = aligned.len();
    if n < 2 {
        return Err(FinPilotError::InsufficientData(format!(
            "At least 2 aligned price observations required, got {n}"
        )));
    }

    let longest = input.equity.len().max(input.gold.len()).max(input.debt.len());
    if longest > n {
        warnings.push(format!(
            "{} observations dropped during date alignment",
            longest - n
        ));
    }

    // Periodic percentage change per asset, combined under the weights
    let mut portfolio_returns: Vec<Rate> = Vec::with_capacity(n - 1);
    for window in aligned.windows(2) {
        let (_, e0, g0, d0) = window[0];
        let (_, e1, g1, d1) = window[1];
        let r = input.weights.equity * (e1 / e0 - Decimal::ONE)
            + input.weights.gold * (g1 / g0 - Decimal::ONE)
            + input.weights.debt * (d1 / d0 - Decimal::ONE);
        portfolio_returns.push(r);
    }

    let periods = input.frequency.periods_per_year();
    let count = Decimal::from(portfolio_returns.len() as i64);
    let mean: Decimal = portfolio_returns.iter().sum::<Decimal>() / count;
    let annualised_return = mean * periods;

    let variance = sample_variance(&portfolio_returns, mean);
    let annualised_volatility = sqrt_decimal(variance) * sqrt_decimal(periods);

    if annualised_volatility.is_zero() {
        warnings.push("Volatility is zero; Sharpe ratio is undefined for this series".into());
    }

    let output = ReturnStatisticsOutput {
        annualised_return,
        annualised_volatility,
        portfolio_returns,
        observations: n,
        aligned_from: aligned[0].0,
        aligned_to: aligned[n - 1].0,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted Portfolio Return Statistics (inner-join alignment, sample volatility)",
        &serde_json::json!({
            "observations": n,
            "frequency": format!("{:?}", input.frequency),
            "weights": input.weights,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Reject empty series, non-increasing dates, and non-positive prices.
fn validate_series(name: &str, series: &PriceSeries) -> FinPilotResult<()> {
    if series.is_empty() {
        return Err(FinPilotError::InsufficientData(format!(
            "Price series '{name}' is empty"
        )));
    }
    let mut prev: Option<NaiveDate> = None;
    for point in series {
        if point.price <= Decimal::ZERO {
            return Err(FinPilotError::InvalidInput {
                field: format!("{name}.price"),
                reason: format!("Non-positive price {} at {}", point.price, point.date),
            });
        }
        if let Some(p) = prev {
            if point.date <= p {
                return Err(FinPilotError::InvalidInput {
                    field: format!("{name}.date"),
                    reason: format!("Dates must be strictly increasing; {} follows {p}", point.date),
                });
            }
        }
        prev = Some(point.date);
    }
    Ok(())
}

/// Inner join of the three series on date. Output is ordered by date and
/// contains only dates present in all three inputs.
fn align_series(
    equity: &PriceSeries,
    gold: &PriceSeries,
    debt: &PriceSeries,
) -> Vec<(NaiveDate, Money, Money, Money)> {
    let gold_by_date: BTreeMap<NaiveDate, Money> =
        gold.iter().map(|p| (p.date, p.price)).collect();
    let debt_by_date: BTreeMap<NaiveDate, Money> =
        debt.iter().map(|p| (p.date, p.price)).collect();

    equity
        .iter()
        .filter_map(|p| {
            let g = gold_by_date.get(&p.date)?;
            let d = debt_by_date.get(&p.date)?;
            Some((p.date, p.price, *g, *d))
        })
        .collect()
}

/// Sample variance (n-1 denominator)
fn sample_variance(data: &[Decimal], mean: Decimal) -> Decimal {
    let n = data.len();
    if n < 2 {
        return Decimal::ZERO;
    }
    let sum_sq: Decimal = data.iter().map(|x| (x - mean) * (x - mean)).sum();
    sum_sq / Decimal::from((n - 1) as i64)
}

fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn series(points: &[(u32, &str)]) -> PriceSeries {
        points
            .iter()
            .map(|(day, price)| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, *day).unwrap(),
                price: price.parse().unwrap(),
            })
            .collect()
    }

    fn weights() -> PortfolioWeights {
        PortfolioWeights {
            equity: dec!(0.6),
            gold: dec!(0.2),
            debt: dec!(0.2),
        }
    }

    fn basic_input() -> ReturnStatisticsInput {
        ReturnStatisticsInput {
            equity: series(&[(1, "100"), (2, "102"), (3, "101"), (4, "105")]),
            gold: series(&[(1, "50"), (2, "50.5"), (3, "50.2"), (4, "50.8")]),
            debt: series(&[(1, "80"), (2, "80.1"), (3, "80.2"), (4, "80.3")]),
            weights: weights(),
            frequency: ReturnFrequency::Daily,
        }
    }

    #[test]
    fn test_basic_statistics() {
        let result = calculate_return_statistics(&basic_input()).unwrap();
        let out = &result.result;
        assert_eq!(out.observations, 4);
        assert_eq!(out.portfolio_returns.len(), 3);
        assert!(out.annualised_volatility > Decimal::ZERO);
    }

    #[test]
    fn test_alignment_drops_missing_dates() {
        let mut input = basic_input();
        // Gold is missing Jan 3rd; that date must be dropped everywhere
        input.gold = series(&[(1, "50"), (2, "50.5"), (4, "50.8")]);
        let result = calculate_return_statistics(&input).unwrap();
        assert_eq!(result.result.observations, 3);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("dropped during date alignment")));
    }

    #[test]
    fn test_insufficient_overlap() {
        let mut input = basic_input();
        input.debt = series(&[(1, "80")]);
        assert!(matches!(
            calculate_return_statistics(&input),
            Err(FinPilotError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_single_asset_weighting() {
        // All weight on equity: portfolio return equals the equity return
        let mut input = basic_input();
        input.weights = PortfolioWeights {
            equity: dec!(1),
            gold: dec!(0),
            debt: dec!(0),
        };
        let result = calculate_return_statistics(&input).unwrap();
        let first = result.result.portfolio_returns[0];
        assert_eq!(first, dec!(102) / dec!(100) - Decimal::ONE);
    }

    #[test]
    fn test_flat_prices_zero_volatility() {
        let flat = series(&[(1, "100"), (2, "100"), (3, "100")]);
        let input = ReturnStatisticsInput {
            equity: flat.clone(),
            gold: flat.clone(),
            debt: flat,
            weights: weights(),
            frequency: ReturnFrequency::Daily,
        };
        let result = calculate_return_statistics(&input).unwrap();
        assert_eq!(result.result.annualised_return, Decimal::ZERO);
        assert_eq!(result.result.annualised_volatility, Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.contains("zero")));
    }

    #[test]
    fn test_unsorted_dates_rejected() {
        let mut input = basic_input();
        input.equity.swap(1, 2);
        assert!(calculate_return_statistics(&input).is_err());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut input = basic_input();
        input.equity[1].price = dec!(0);
        assert!(calculate_return_statistics(&input).is_err());
    }

    #[test]
    fn test_monthly_annualisation_smaller_than_daily() {
        let daily = calculate_return_statistics(&basic_input()).unwrap();
        let mut input = basic_input();
        input.frequency = ReturnFrequency::Monthly;
        let monthly = calculate_return_statistics(&input).unwrap();
        assert!(
            monthly.result.annualised_return.abs() < daily.result.annualised_return.abs()
        );
    }
}
