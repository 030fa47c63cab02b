use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Every scoring constant in one place.
///
/// The original prototypes disagreed on several of these values; a deployment
/// picks one profile (defaults below, or a JSON file via
/// `SCORING_PROFILE_PATH`) and all formulas read from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringProfile {
    // CV valuation
    pub base_skill_points: f64,
    pub rare_skill_bonus: f64,
    pub points_per_experience_year: f64,
    pub points_per_diploma: f64,
    pub middle_level_threshold: f64,
    pub senior_level_threshold: f64,

    // Monthly universal income (RUM)
    pub coin_per_cv_point: f64,
    pub coin_per_utmi: f64,
    pub junior_level_bonus: f64,
    pub middle_level_bonus: f64,
    pub senior_level_bonus: f64,
    pub monthly_income_cap: f64,

    // Interaction valuation (UTMi)
    pub utmi_per_word: f64,
    pub complexity_weight: f64,
    pub impact_weight: f64,
    pub creativity_bonus: f64,
    pub unique_concept_bonus: f64,

    // Cost model. EUR amounts are derived from USD through a static rate:
    // eur = usd / eur_usd_exchange_rate.
    pub cost_per_word_usd: f64,
    pub eur_usd_exchange_rate: f64,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            base_skill_points: 5.0,
            rare_skill_bonus: 50.0,
            points_per_experience_year: 10.0,
            points_per_diploma: 20.0,
            middle_level_threshold: 100.0,
            senior_level_threshold: 250.0,

            coin_per_cv_point: 0.5,
            coin_per_utmi: 0.1,
            junior_level_bonus: 0.0,
            middle_level_bonus: 100.0,
            senior_level_bonus: 250.0,
            monthly_income_cap: 5000.0,

            utmi_per_word: 0.1,
            complexity_weight: 0.5,
            impact_weight: 0.3,
            creativity_bonus: 2.0,
            unique_concept_bonus: 5.0,

            cost_per_word_usd: 0.0002,
            eur_usd_exchange_rate: 1.08,
        }
    }
}

impl ScoringProfile {
    /// Loads a profile from a JSON file, or the defaults when no path is set.
    /// Fields absent from the file keep their default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read scoring profile at {}", path.display())
                })?;
                let profile: ScoringProfile = serde_json::from_str(&raw).with_context(|| {
                    format!("Invalid scoring profile JSON at {}", path.display())
                })?;
                info!("Scoring profile loaded from {}", path.display());
                Ok(profile)
            }
            None => Ok(ScoringProfile::default()),
        }
    }
}
