//! Aggregate dashboard view over the interaction log, conversations, and the
//! last CV valuation.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::scoring::cv::{
    calculate_initial_cv_value, calculate_monthly_universal_income, cv_level,
};
use crate::scoring::round2;
use crate::scoring::utmi::usd_to_eur;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvValuation {
    pub cvnu_value: f64,
    pub level: &'static str,
    pub monthly_universal_income: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInsights {
    pub total_utmi: f64,
    pub total_interactions: usize,
    pub total_conversations: usize,
    pub total_estimated_cost_usd: f64,
    pub total_estimated_cost_eur: f64,
    /// Present once a CV has been parsed.
    pub cv: Option<CvValuation>,
}

/// GET /api/dashboard-insights
pub async fn handle_dashboard_insights(State(state): State<AppState>) -> Json<DashboardInsights> {
    let totals = state.store.log_totals().await;
    let total_conversations = state.store.conversation_count().await;

    let cv = match state.store.last_cv().await {
        Some(cv) => {
            let score = calculate_initial_cv_value(&cv, &state.profile);
            let level = cv_level(score, &state.profile);
            let income = calculate_monthly_universal_income(
                score,
                level,
                totals.total_utmi,
                &state.profile,
            );
            Some(CvValuation {
                cvnu_value: round2(score),
                level: level.as_str(),
                monthly_universal_income: round2(income),
            })
        }
        None => None,
    };

    Json(DashboardInsights {
        total_utmi: round2(totals.total_utmi),
        total_interactions: totals.interaction_count,
        total_conversations,
        total_estimated_cost_usd: round2(totals.total_cost_usd),
        total_estimated_cost_eur: round2(usd_to_eur(totals.total_cost_usd, &state.profile)),
        cv,
    })
}
