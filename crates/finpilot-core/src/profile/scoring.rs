use serde::{Deserialize, Serialize};

/// Whether the user's income is dependable month to month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeStability {
    Stable,
    Unstable,
}

/// Self-reported investing experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentExperience {
    Low,
    High,
}

/// Point-in-time risk-tolerance signals for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    pub age: u32,
    pub income_stability: IncomeStability,
    pub experience: InvestmentExperience,
    pub has_emergency_fund: bool,
}

pub const MAX_RISK_SCORE: u8 = 100;

/// Additive risk-tolerance score in [0, 100].
///
/// Each signal contributes independently and order does not matter:
/// age under 30 +20, stable income +25, high experience +25, emergency
/// fund +30. The weights sum to exactly 100; the final clamp keeps the
/// score within bounds should the weights ever be retuned.
pub fn risk_score(profile: &RiskProfile) -> u8 {
    let mut score: u8 = 0;
    if profile.age < 30 {
        score += 20;
    }
    if profile.income_stability == IncomeStability::Stable {
        score += 25;
    }
    if profile.experience == InvestmentExperience::High {
        score += 25;
    }
    if profile.has_emergency_fund {
        score += 30;
    }
    score.min(MAX_RISK_SCORE)
}
