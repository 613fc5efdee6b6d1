use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::time::Instant;

use crate::error::FinPilotError;
use crate::types::{ComputationMetadata, ComputationOutput, MAX_HORIZON_YEARS};
use crate::FinPilotResult;

// ---------------------------------------------------------------------------
// Helper: build ComputationOutput without requiring Decimal
// ---------------------------------------------------------------------------

fn with_metadata_f64<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

pub const MIN_SIMULATIONS: u32 = 100;
pub const MAX_SIMULATIONS: u32 = 1_000_000;

fn default_num_simulations() -> u32 {
    1_000
}

/// Input for a goal-achievement simulation.
///
/// Each path compounds `horizon_years` annual returns drawn from
/// Normal(annual_return, volatility), with the year's SIP contributions
/// injected before the draw is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSimulationInput {
    /// Expected annual portfolio return (0.12 = 12%).
    pub annual_return: f64,
    /// Annual return volatility (standard deviation).
    pub volatility: f64,
    /// Monthly contribution.
    pub monthly_sip: f64,
    pub horizon_years: u32,
    /// Corpus the plan is trying to reach.
    pub target_amount: f64,
    /// Number of simulation paths (minimum 100).
    #[serde(default = "default_num_simulations")]
    pub num_simulations: u32,
    /// Optional seed for reproducibility.
    pub seed: Option<u64>,
}

/// Percentile summary of final corpus values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalPercentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// A single histogram bin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Output of a goal-achievement simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSimulationOutput {
    /// Share of paths whose final corpus reached the target.
    pub goal_probability: f64,
    pub mean_final_value: f64,
    pub median_final_value: f64,
    pub std_dev_final_value: f64,
    pub min_final_value: f64,
    pub max_final_value: f64,
    pub percentiles: GoalPercentiles,
    pub histogram: Vec<HistogramBin>,
    pub simulation_count: u32,
    /// Terminal corpus of every path, sorted ascending, for downstream
    /// distribution inspection.
    pub final_values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

/// Compute the percentile value from a **sorted** slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Build a histogram with `num_bins` equal-width bins.
fn build_histogram(sorted: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    let min_val = sorted[0];
    let max_val = sorted[sorted.len() - 1];

    // Handle case where all values are the same
    if (max_val - min_val).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min_val,
            upper: max_val,
            count: sorted.len() as u32,
            frequency: 1.0,
        }];
    }

    let bin_width = (max_val - min_val) / num_bins as f64;
    let n = sorted.len() as f64;

    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| {
            let lower = min_val + i as f64 * bin_width;
            let upper = if i == num_bins - 1 {
                max_val
            } else {
                min_val + (i + 1) as f64 * bin_width
            };
            HistogramBin {
                lower,
                upper,
                count: 0,
                frequency: 0.0,
            }
        })
        .collect();

    for &val in sorted {
        let mut idx = ((val - min_val) / bin_width).floor() as usize;
        if idx >= num_bins {
            idx = num_bins - 1;
        }
        bins[idx].count += 1;
    }

    for bin in &mut bins {
        bin.frequency = bin.count as f64 / n;
    }

    bins
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &GoalSimulationInput) -> FinPilotResult<()> {
    if input.num_simulations < MIN_SIMULATIONS {
        return Err(FinPilotError::InvalidInput {
            field: "num_simulations".into(),
            reason: format!("Must be at least {MIN_SIMULATIONS}"),
        });
    }
    if input.num_simulations > MAX_SIMULATIONS {
        return Err(FinPilotError::InvalidInput {
            field: "num_simulations".into(),
            reason: format!("Must be at most {MAX_SIMULATIONS}"),
        });
    }
    if !input.annual_return.is_finite() {
        return Err(FinPilotError::InvalidInput {
            field: "annual_return".into(),
            reason: "Must be finite".into(),
        });
    }
    if !input.volatility.is_finite() || input.volatility < 0.0 {
        return Err(FinPilotError::InvalidInput {
            field: "volatility".into(),
            reason: format!("Must be finite and >= 0, got {}", input.volatility),
        });
    }
    if !input.target_amount.is_finite() || input.target_amount <= 0.0 {
        return Err(FinPilotError::InvalidGoal {
            field: "target_amount".into(),
            reason: format!("Target amount must be > 0, got {}", input.target_amount),
        });
    }
    if !input.monthly_sip.is_finite() || input.monthly_sip < 0.0 {
        return Err(FinPilotError::InvalidInput {
            field: "monthly_sip".into(),
            reason: format!("Must be finite and >= 0, got {}", input.monthly_sip),
        });
    }
    if input.horizon_years == 0 || input.horizon_years > MAX_HORIZON_YEARS {
        return Err(FinPilotError::InvalidGoal {
            field: "horizon_years".into(),
            reason: format!(
                "Horizon must be within 1..={MAX_HORIZON_YEARS} years, got {}",
                input.horizon_years
            ),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a Monte Carlo goal-achievement simulation.
///
/// Per path, the corpus starts at zero; each year the full year of SIP
/// contributions is added and the sum grows by one draw from
/// Normal(annual_return, volatility). A negative draw below -100% floors
/// the corpus at zero rather than going negative. Goal probability is the
/// fraction of paths whose final corpus meets or exceeds the target.
pub fn run_goal_simulation(
    input: &GoalSimulationInput,
) -> FinPilotResult<ComputationOutput<GoalSimulationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let mut rng = match input.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    // Normal::new rejects a zero standard deviation; at zero volatility
    // every draw is the expected return and all paths coincide.
    let normal = if input.volatility > 0.0 {
        Some(
            Normal::new(input.annual_return, input.volatility).map_err(|e| {
                FinPilotError::InvalidInput {
                    field: "volatility".into(),
                    reason: format!("Invalid Normal parameters: {e}"),
                }
            })?,
        )
    } else {
        warnings.push("Volatility is zero; all simulation paths are identical".into());
        None
    };

    let n = input.num_simulations as usize;
    let annual_sip = input.monthly_sip * 12.0;
    let mut final_values: Vec<f64> = Vec::with_capacity(n);
    let mut successes: u32 = 0;

    for _ in 0..n {
        let mut wealth = 0.0_f64;
        for _ in 0..input.horizon_years {
            let x = match &normal {
                Some(dist) => rng.sample(*dist),
                None => input.annual_return,
            };
            wealth = (wealth + annual_sip) * (1.0 + x);
            if wealth < 0.0 {
                wealth = 0.0;
            }
        }
        if wealth >= input.target_amount {
            successes += 1;
        }
        final_values.push(wealth);
    }

    final_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = final_values.len() as f64;
    let mean = final_values.iter().sum::<f64>() / count;
    let variance = final_values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let std_dev = variance.sqrt();
    let median = percentile_sorted(&final_values, 50.0);

    let percentiles = GoalPercentiles {
        p5: percentile_sorted(&final_values, 5.0),
        p10: percentile_sorted(&final_values, 10.0),
        p25: percentile_sorted(&final_values, 25.0),
        p50: median,
        p75: percentile_sorted(&final_values, 75.0),
        p90: percentile_sorted(&final_values, 90.0),
        p95: percentile_sorted(&final_values, 95.0),
    };

    let histogram = build_histogram(&final_values, 20);

    let min_final_value = final_values[0];
    let max_final_value = final_values[final_values.len() - 1];
    let output = GoalSimulationOutput {
        goal_probability: successes as f64 / count,
        mean_final_value: mean,
        median_final_value: median,
        std_dev_final_value: std_dev,
        min_final_value,
        max_final_value,
        percentiles,
        histogram,
        simulation_count: input.num_simulations,
        final_values,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Monte Carlo Goal Simulation (annual normal returns, yearly SIP injection)",
        &serde_json::json!({
            "annual_return": input.annual_return,
            "volatility": input.volatility,
            "monthly_sip": input.monthly_sip,
            "horizon_years": input.horizon_years,
            "target_amount": input.target_amount,
            "num_simulations": input.num_simulations,
            "seed": input.seed,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: u64 = 42;

    fn basic_input() -> GoalSimulationInput {
        GoalSimulationInput {
            annual_return: 0.12,
            volatility: 0.15,
            monthly_sip: 12_123.0,
            horizon_years: 5,
            target_amount: 1_000_000.0,
            num_simulations: 10_000,
            seed: Some(SEED),
        }
    }

    #[test]
    fn test_basic_simulation_runs() {
        let result = run_goal_simulation(&basic_input()).unwrap();
        let out = &result.result;
        assert_eq!(out.simulation_count, 10_000);
        assert!(out.mean_final_value > 0.0);
        assert!((0.0..=1.0).contains(&out.goal_probability));
    }

    #[test]
    fn test_seeded_reproducibility() {
        let input = basic_input();
        let r1 = run_goal_simulation(&input).unwrap();
        let r2 = run_goal_simulation(&input).unwrap();
        assert_eq!(r1.result.goal_probability, r2.result.goal_probability);
        assert_eq!(r1.result.mean_final_value, r2.result.mean_final_value);
        assert_eq!(r1.result.median_final_value, r2.result.median_final_value);
    }

    #[test]
    fn test_zero_volatility_is_deterministic() {
        let mut input = basic_input();
        input.volatility = 0.0;
        let result = run_goal_simulation(&input).unwrap();
        let out = &result.result;

        // All paths coincide
        assert_eq!(out.min_final_value, out.max_final_value);
        assert!(out.std_dev_final_value < 1e-6);
        assert!(out.goal_probability == 0.0 || out.goal_probability == 1.0);
        assert!(result.warnings.iter().any(|w| w.contains("identical")));

        // The deterministic path equals the compounded annuity value
        let annual_sip = input.monthly_sip * 12.0;
        let mut expected = 0.0_f64;
        for _ in 0..input.horizon_years {
            expected = (expected + annual_sip) * (1.0 + input.annual_return);
        }
        assert!((out.mean_final_value - expected).abs() < 1e-3);
    }

    #[test]
    fn test_sized_sip_succeeds_deterministically() {
        // A contribution sized for the target at the expected return
        // reaches it with certainty when volatility is zero.
        let input = GoalSimulationInput {
            annual_return: 0.12,
            volatility: 0.0,
            monthly_sip: 13_000.0,
            horizon_years: 5,
            target_amount: 1_000_000.0,
            num_simulations: 1_000,
            seed: Some(SEED),
        };
        let result = run_goal_simulation(&input).unwrap();
        assert_eq!(result.result.goal_probability, 1.0);
    }

    #[test]
    fn test_probability_rises_with_contribution() {
        let mut low = basic_input();
        low.monthly_sip = 6_000.0;
        let mut high = basic_input();
        high.monthly_sip = 20_000.0;
        let p_low = run_goal_simulation(&low).unwrap().result.goal_probability;
        let p_high = run_goal_simulation(&high).unwrap().result.goal_probability;
        assert!(p_high > p_low, "p_high={p_high} p_low={p_low}");
    }

    #[test]
    fn test_unreachable_target_has_zero_probability() {
        let mut input = basic_input();
        input.target_amount = 1e15;
        let result = run_goal_simulation(&input).unwrap();
        assert_eq!(result.result.goal_probability, 0.0);
    }

    #[test]
    fn test_percentile_ordering() {
        let result = run_goal_simulation(&basic_input()).unwrap();
        let p = &result.result.percentiles;
        assert!(p.p5 <= p.p10);
        assert!(p.p10 <= p.p25);
        assert!(p.p25 <= p.p50);
        assert!(p.p50 <= p.p75);
        assert!(p.p75 <= p.p90);
        assert!(p.p90 <= p.p95);
    }

    #[test]
    fn test_final_values_sorted_and_complete() {
        let result = run_goal_simulation(&basic_input()).unwrap();
        let values = &result.result.final_values;
        assert_eq!(values.len(), 10_000);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values[0], result.result.min_final_value);
    }

    #[test]
    fn test_histogram_total_count() {
        let result = run_goal_simulation(&basic_input()).unwrap();
        let h = &result.result.histogram;
        assert_eq!(h.len(), 20);
        let total: u32 = h.iter().map(|b| b.count).sum();
        assert_eq!(total, 10_000);
    }

    #[test]
    fn test_final_values_never_negative() {
        // Heavy volatility produces draws below -100%; the corpus floor
        // must hold.
        let input = GoalSimulationInput {
            annual_return: 0.0,
            volatility: 2.0,
            monthly_sip: 10_000.0,
            horizon_years: 10,
            target_amount: 1_000_000.0,
            num_simulations: 10_000,
            seed: Some(SEED),
        };
        let result = run_goal_simulation(&input).unwrap();
        assert!(result.result.min_final_value >= 0.0);
    }

    #[test]
    fn test_convergence_toward_deterministic_mean() {
        // With modest volatility the sample mean stays near the
        // zero-volatility corpus.
        let mut deterministic = basic_input();
        deterministic.volatility = 0.0;
        let expected = run_goal_simulation(&deterministic)
            .unwrap()
            .result
            .mean_final_value;

        let mut noisy = basic_input();
        noisy.volatility = 0.05;
        noisy.num_simulations = 100_000;
        let mean = run_goal_simulation(&noisy).unwrap().result.mean_final_value;

        assert!(
            (mean - expected).abs() / expected < 0.02,
            "mean={mean} expected={expected}"
        );
    }

    #[test]
    fn test_min_simulations_validation() {
        let mut input = basic_input();
        input.num_simulations = 50;
        assert!(run_goal_simulation(&input).is_err());
    }

    #[test]
    fn test_max_simulations_validation() {
        let mut input = basic_input();
        input.num_simulations = 2_000_000;
        assert!(run_goal_simulation(&input).is_err());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut negative_vol = basic_input();
        negative_vol.volatility = -0.1;
        assert!(run_goal_simulation(&negative_vol).is_err());

        let mut zero_target = basic_input();
        zero_target.target_amount = 0.0;
        assert!(run_goal_simulation(&zero_target).is_err());

        let mut negative_sip = basic_input();
        negative_sip.monthly_sip = -1.0;
        assert!(run_goal_simulation(&negative_sip).is_err());

        let mut zero_horizon = basic_input();
        zero_horizon.horizon_years = 0;
        assert!(run_goal_simulation(&zero_horizon).is_err());

        let mut long_horizon = basic_input();
        long_horizon.horizon_years = 101;
        assert!(run_goal_simulation(&long_horizon).is_err());

        let mut nan_return = basic_input();
        nan_return.annual_return = f64::NAN;
        assert!(run_goal_simulation(&nan_return).is_err());
    }

    #[test]
    fn test_default_num_simulations() {
        let parsed: GoalSimulationInput = serde_json::from_str(
            r#"{
                "annual_return": 0.12,
                "volatility": 0.15,
                "monthly_sip": 12123.0,
                "horizon_years": 5,
                "target_amount": 1000000.0,
                "seed": 42
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.num_simulations, 1_000);
    }

    #[test]
    fn test_metadata_precision_field() {
        let result = run_goal_simulation(&basic_input()).unwrap();
        assert_eq!(result.metadata.precision, "ieee754_f64");
    }
}
