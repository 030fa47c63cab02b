//! Interaction valuation (UTMi).
//!
//! UTMi is word count × a base rate, scaled by complexity and impact
//! multipliers, plus flat bonuses for detected traits. Accumulation is a
//! plain additive fold; EUR cost figures derive from USD through a static
//! configured exchange rate.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::interaction::InteractionRecord;
use crate::scoring::profile::ScoringProfile;

/// Caller-supplied signals about an interaction. All default to neutral.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionSignals {
    pub complexity: f64,
    pub impact: f64,
    pub creativity: bool,
    pub unique_concept: bool,
}

fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Per-interaction UTMi. Always non-negative; unrounded (round only for
/// display).
pub fn calculate_utmi(
    content: &str,
    signals: &InteractionSignals,
    profile: &ScoringProfile,
) -> f64 {
    let base = word_count(content) as f64 * profile.utmi_per_word;
    let complexity_multiplier = 1.0 + signals.complexity * profile.complexity_weight;
    let impact_multiplier = 1.0 + signals.impact * profile.impact_weight;

    let mut utmi = base * complexity_multiplier * impact_multiplier;
    if signals.creativity {
        utmi += profile.creativity_bonus;
    }
    if signals.unique_concept {
        utmi += profile.unique_concept_bonus;
    }
    utmi.max(0.0)
}

/// Builds a scored, timestamped log record for an interaction.
pub fn build_record(
    content: String,
    signals: InteractionSignals,
    profile: &ScoringProfile,
) -> InteractionRecord {
    let utmi = calculate_utmi(&content, &signals, profile);
    let estimated_cost_usd = estimated_cost_usd(&content, profile);
    InteractionRecord {
        id: Uuid::new_v4(),
        content,
        complexity: signals.complexity,
        impact: signals.impact,
        creativity: signals.creativity,
        unique_concept: signals.unique_concept,
        utmi,
        estimated_cost_usd,
        created_at: Utc::now(),
    }
}

/// Additive fold over the per-record values computed at append time.
pub fn calculate_total_utmi(records: &[InteractionRecord]) -> f64 {
    records.iter().map(|r| r.utmi).sum()
}

pub fn estimated_cost_usd(content: &str, profile: &ScoringProfile) -> f64 {
    word_count(content) as f64 * profile.cost_per_word_usd
}

/// eur = usd / rate, with the rate quoted as USD per EUR.
pub fn usd_to_eur(usd: f64, profile: &ScoringProfile) -> f64 {
    usd / profile.eur_usd_exchange_rate
}
