use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinPilotError;
use crate::types::{Goal, Money, Rate};
use crate::FinPilotResult;

/// Monthly rates below this magnitude use the zero-rate limit of the
/// annuity formula instead of the closed form.
const ZERO_RATE_EPSILON: Decimal = dec!(0.000000001);

/// Annual returns above this are rejected to keep compounded factors bounded.
const MAX_ANNUAL_RETURN: Decimal = dec!(1.0);

/// A sized systematic investment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipQuote {
    /// Level monthly contribution, rounded to the nearest currency unit.
    pub monthly_contribution: Money,
    /// Contribution before rounding.
    pub monthly_contribution_exact: Money,
    pub monthly_rate: Rate,
    pub months: u32,
    /// Total paid in over the horizon (rounded contribution x months).
    pub total_invested: Money,
    /// Target corpus minus total invested.
    pub expected_gain: Money,
}

/// Solve the annuity-due future-value equation for the level monthly
/// contribution `P` that reaches the goal:
///
///   target = P x ((1+r)^n - 1)/r x (1+r)
///
/// where `r` is the monthly rate and `n` the number of months. The closed
/// form divides by zero at r == 0; the limiting value `P = target / n`
/// applies there.
pub fn size_sip(goal: &Goal, annual_return: Rate) -> FinPilotResult<SipQuote> {
    goal.validate()?;

    if annual_return <= dec!(-1) {
        return Err(FinPilotError::InvalidInput {
            field: "annual_return".into(),
            reason: "Annual return must be greater than -100%".into(),
        });
    }
    if annual_return > MAX_ANNUAL_RETURN {
        return Err(FinPilotError::InvalidInput {
            field: "annual_return".into(),
            reason: format!("Annual return above {MAX_ANNUAL_RETURN} is not supported"),
        });
    }

    let monthly_rate = annual_return / dec!(12);
    let months = goal.horizon_years * 12;
    let months_dec = Decimal::from(months);

    let exact = if monthly_rate.abs() < ZERO_RATE_EPSILON {
        goal.target_amount / months_dec
    } else {
        let factor =
            annuity_factor(monthly_rate, months).ok_or_else(|| FinPilotError::InvalidGoal {
                field: "target_amount".into(),
                reason: format!(
                    "Annuity factor is not finite for rate {monthly_rate} over {months} months"
                ),
            })?;
        goal.target_amount
            .checked_div(factor)
            .ok_or_else(|| FinPilotError::InvalidGoal {
                field: "target_amount".into(),
                reason: format!(
                    "Contribution is not finite for rate {monthly_rate} over {months} months"
                ),
            })?
    };

    let monthly_contribution = exact.round();
    let total_invested = monthly_contribution * months_dec;

    Ok(SipQuote {
        monthly_contribution,
        monthly_contribution_exact: exact,
        monthly_rate,
        months,
        total_invested,
        expected_gain: goal.target_amount - total_invested,
    })
}

/// Future value of an annuity-due: a level `contribution` at the start of
/// each of `months` periods, compounding at `monthly_rate` per period.
pub fn annuity_fv(contribution: Money, monthly_rate: Rate, months: u32) -> FinPilotResult<Money> {
    if monthly_rate <= dec!(-1) {
        return Err(FinPilotError::InvalidInput {
            field: "monthly_rate".into(),
            reason: "Monthly rate must be greater than -100%".into(),
        });
    }
    if monthly_rate.abs() < ZERO_RATE_EPSILON {
        return Ok(contribution * Decimal::from(months));
    }
    let factor =
        annuity_factor(monthly_rate, months).ok_or_else(|| FinPilotError::InvalidInput {
            field: "monthly_rate".into(),
            reason: format!(
                "Annuity factor is not finite for rate {monthly_rate} over {months} months"
            ),
        })?;
    contribution
        .checked_mul(factor)
        .ok_or_else(|| FinPilotError::InvalidInput {
            field: "contribution".into(),
            reason: "Future value overflowed".into(),
        })
}

/// ((1+r)^n - 1)/r x (1+r), with (1+r)^n computed by iterative
/// multiplication (avoids Decimal::powd drift). None on overflow.
fn annuity_factor(monthly_rate: Rate, months: u32) -> Option<Decimal> {
    let one_plus_r = Decimal::ONE + monthly_rate;
    let mut compounded = Decimal::ONE;
    for _ in 0..months {
        compounded = compounded.checked_mul(one_plus_r)?;
    }
    let annuity = (compounded - Decimal::ONE).checked_div(monthly_rate)?;
    annuity.checked_mul(one_plus_r)
}
