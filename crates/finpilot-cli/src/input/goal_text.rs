use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finpilot_core::error::FinPilotError;
use finpilot_core::types::Goal;
use finpilot_core::FinPilotResult;

const LAKH: Decimal = dec!(100000);
const CRORE: Decimal = dec!(10000000);

/// Parse a free-text goal like "save 10 lakh in 5 years" into a Goal.
///
/// The parser scans for a number followed by an optional magnitude word
/// ("lakh" or "crore") as the target, and a number followed by a year
/// word as the horizon. A bare number of at least 1000 with no unit is
/// taken as the target amount.
pub fn parse_goal(text: &str) -> FinPilotResult<Goal> {
    let tokens: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .collect();

    let mut target: Option<Decimal> = None;
    let mut years: Option<u32> = None;

    let mut i = 0;
    while i < tokens.len() {
        if let Ok(num) = tokens[i].parse::<Decimal>() {
            let unit = tokens.get(i + 1).map(String::as_str).unwrap_or("");
            if unit.starts_with("lakh") || unit.starts_with("lac") {
                target = Some(num * LAKH);
                i += 2;
                continue;
            }
            if unit.starts_with("crore") || unit == "cr" {
                target = Some(num * CRORE);
                i += 2;
                continue;
            }
            if unit.starts_with("year") || unit.starts_with("yr") {
                years = num.to_u32();
                i += 2;
                continue;
            }
            if target.is_none() && num >= dec!(1000) {
                target = Some(num);
            }
        }
        i += 1;
    }

    match (target, years) {
        (Some(target_amount), Some(horizon_years)) => Goal::new(target_amount, horizon_years),
        _ => Err(FinPilotError::UnparseableGoal(format!(
            "Could not find both a target amount and a horizon in '{text}'"
        ))),
    }
}

/// Strip currency symbols, commas, and trailing punctuation from a token.
fn clean_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lakh_goal() {
        let goal = parse_goal("I want to save 10 lakh in 5 years").unwrap();
        assert_eq!(goal.target_amount, dec!(1000000));
        assert_eq!(goal.horizon_years, 5);
    }

    #[test]
    fn test_singular_lakh_and_year() {
        let goal = parse_goal("1 lakh in 1 year").unwrap();
        assert_eq!(goal.target_amount, dec!(100000));
        assert_eq!(goal.horizon_years, 1);
    }

    #[test]
    fn test_crore_goal() {
        let goal = parse_goal("retire with 2 crore in 25 years").unwrap();
        assert_eq!(goal.target_amount, dec!(20000000));
        assert_eq!(goal.horizon_years, 25);
    }

    #[test]
    fn test_plain_amount() {
        let goal = parse_goal("need 500000 for a car in 3 years").unwrap();
        assert_eq!(goal.target_amount, dec!(500000));
        assert_eq!(goal.horizon_years, 3);
    }

    #[test]
    fn test_indian_comma_grouping() {
        let goal = parse_goal("save 12,50,000 in 7 yrs").unwrap();
        assert_eq!(goal.target_amount, dec!(1250000));
        assert_eq!(goal.horizon_years, 7);
    }

    #[test]
    fn test_fractional_lakh() {
        let goal = parse_goal("2.5 lakhs in 4 years").unwrap();
        assert_eq!(goal.target_amount, dec!(250000));
    }

    #[test]
    fn test_missing_years_rejected() {
        assert!(matches!(
            parse_goal("I want 10 lakh"),
            Err(FinPilotError::UnparseableGoal(_))
        ));
    }

    #[test]
    fn test_missing_target_rejected() {
        assert!(matches!(
            parse_goal("in 5 years"),
            Err(FinPilotError::UnparseableGoal(_))
        ));
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(parse_goal("").is_err());
    }

    #[test]
    fn test_small_bare_number_is_not_a_target() {
        // 500 with no unit is too small to be a goal corpus
        assert!(parse_goal("500 in 5 years").is_err());
    }
}
