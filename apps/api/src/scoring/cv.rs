//! CV parsing and valuation.
//!
//! Free-text CVs are scanned against fixed keyword tables (no LLM call) and
//! valued with a deterministic point formula. The three-tier level is a step
//! function of the score with `>=` at each published threshold.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::cv::StructuredCv;
use crate::scoring::profile::ScoringProfile;

/// Lowercased keyword → canonical skill name.
const SKILL_KEYWORDS: &[(&str, &str)] = &[
    ("python", "Python"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("rust", "Rust"),
    ("java", "Java"),
    ("c++", "C++"),
    ("php", "PHP"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("react", "React"),
    ("node.js", "Node.js"),
    ("docker", "Docker"),
    ("solidity", "Solidity"),
];

/// Keywords that mark a CV as carrying a rare (bonus-worthy) skill.
const RARE_SKILL_KEYWORDS: &[&str] = &["blockchain", "solidity", "zero-knowledge"];

/// Lowercased keyword → canonical diploma name. French degree names, matching
/// the CV corpus the formulas were designed for.
const DIPLOMA_KEYWORDS: &[(&str, &str)] = &[
    ("doctorat", "Doctorat"),
    ("master", "Master"),
    ("licence", "Licence"),
    ("bts", "BTS"),
    ("ingénieur", "Diplôme d'ingénieur"),
];

// Accepts both the ASCII and typographic apostrophe, and both é/e spellings.
static EXPERIENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s*ans\s+d['’]exp[ée]rience").expect("experience regex is valid")
});

/// Scans lowercased text for known skills, rare-skill markers, diplomas, and
/// a `N ans d'expérience` phrase. Total: absence of matches yields a zeroed
/// [`StructuredCv`], never an error.
pub fn parse_and_structure_cv(text: &str) -> StructuredCv {
    let haystack = text.to_lowercase();

    let skills: Vec<String> = SKILL_KEYWORDS
        .iter()
        .filter(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, canonical)| canonical.to_string())
        .collect();

    let diplomas: Vec<String> = DIPLOMA_KEYWORDS
        .iter()
        .filter(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, canonical)| canonical.to_string())
        .collect();

    let has_rare_skill = RARE_SKILL_KEYWORDS.iter().any(|k| haystack.contains(k));

    let experience_years = EXPERIENCE_RE
        .captures(&haystack)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .unwrap_or(0);

    StructuredCv {
        skills,
        experience_years,
        diplomas,
        has_rare_skill,
    }
}

/// CV value in points. Deterministic; totally ordered by score.
pub fn calculate_initial_cv_value(cv: &StructuredCv, profile: &ScoringProfile) -> f64 {
    let rare_bonus = if cv.has_rare_skill {
        profile.rare_skill_bonus
    } else {
        0.0
    };
    cv.skills.len() as f64 * profile.base_skill_points
        + rare_bonus
        + cv.experience_years as f64 * profile.points_per_experience_year
        + cv.diplomas.len() as f64 * profile.points_per_diploma
}

/// Career level derived from the CV value. Ordering: Junior < Middle < Senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CvLevel {
    Junior,
    Middle,
    Senior,
}

impl CvLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CvLevel::Junior => "Junior",
            CvLevel::Middle => "Middle",
            CvLevel::Senior => "Senior",
        }
    }
}

/// Step function with ties broken toward the higher level (`>=` on each
/// boundary).
pub fn cv_level(score: f64, profile: &ScoringProfile) -> CvLevel {
    if score >= profile.senior_level_threshold {
        CvLevel::Senior
    } else if score >= profile.middle_level_threshold {
        CvLevel::Middle
    } else {
        CvLevel::Junior
    }
}

fn level_bonus(level: CvLevel, profile: &ScoringProfile) -> f64 {
    match level {
        CvLevel::Junior => profile.junior_level_bonus,
        CvLevel::Middle => profile.middle_level_bonus,
        CvLevel::Senior => profile.senior_level_bonus,
    }
}

/// Monthly universal income (RUM) in coins, clamped to the configured cap.
pub fn calculate_monthly_universal_income(
    score: f64,
    level: CvLevel,
    total_utmi: f64,
    profile: &ScoringProfile,
) -> f64 {
    let raw = score * profile.coin_per_cv_point
        + total_utmi * profile.coin_per_utmi
        + level_bonus(level, profile);
    raw.clamp(0.0, profile.monthly_income_cap)
}
