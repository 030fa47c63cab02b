//! Axum route handlers for the CV API: parse, valuation, HTML rendering.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::{render_html_prompt, RENDER_HTML_SYSTEM};
use crate::llm_client::strip_code_fences;
use crate::models::conversation::ChatMessage;
use crate::models::cv::StructuredCv;
use crate::scoring::cv::{
    calculate_initial_cv_value, calculate_monthly_universal_income, cv_level,
    parse_and_structure_cv,
};
use crate::scoring::round2;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseCvRequest {
    pub cv_content: Option<String>,
}

/// Body for endpoints that accept an explicit structured CV but fall back to
/// the last parsed one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvSelector {
    pub cv: Option<StructuredCv>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvValueResponse {
    pub cvnu_value: f64,
    pub level: &'static str,
    pub monthly_universal_income: f64,
    pub total_utmi: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderHtmlResponse {
    pub html: String,
}

/// POST /api/cv/parse-and-structure
///
/// Parses free-text CV content and stores it as the last structured CV.
pub async fn handle_parse_and_structure(
    State(state): State<AppState>,
    Json(request): Json<ParseCvRequest>,
) -> Result<Json<StructuredCv>, AppError> {
    let content = request
        .cv_content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("cvContent is required".to_string()))?;

    let cv = parse_and_structure_cv(content);
    if cv.is_empty() {
        tracing::warn!("CV parse matched nothing; storing an empty structured CV");
    }
    state.store.set_last_cv(cv.clone()).await;
    Ok(Json(cv))
}

/// GET /api/cv/last-structured-data
pub async fn handle_last_structured(
    State(state): State<AppState>,
) -> Result<Json<StructuredCv>, AppError> {
    state
        .store
        .last_cv()
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No structured CV has been parsed yet".to_string()))
}

/// POST /api/cv/calculate-value
///
/// Values the given structured CV (or the last parsed one) and derives the
/// level and capped monthly universal income from it plus accumulated UTMi.
pub async fn handle_calculate_value(
    State(state): State<AppState>,
    Json(request): Json<CvSelector>,
) -> Result<Json<CvValueResponse>, AppError> {
    let cv = resolve_cv(&state, request).await?;

    let score = calculate_initial_cv_value(&cv, &state.profile);
    let level = cv_level(score, &state.profile);
    let total_utmi = state.store.log_totals().await.total_utmi;
    let income = calculate_monthly_universal_income(score, level, total_utmi, &state.profile);

    Ok(Json(CvValueResponse {
        cvnu_value: round2(score),
        level: level.as_str(),
        monthly_universal_income: round2(income),
        total_utmi: round2(total_utmi),
    }))
}

/// POST /api/cv/render-html
///
/// Renders the structured CV (or the last parsed one) as an HTML snippet via
/// the completion API.
pub async fn handle_render_html(
    State(state): State<AppState>,
    Json(request): Json<CvSelector>,
) -> Result<Json<RenderHtmlResponse>, AppError> {
    let cv = resolve_cv(&state, request).await?;

    let prompt = render_html_prompt(&cv);
    let reply = state
        .llm
        .complete(RENDER_HTML_SYSTEM, &[ChatMessage::user(prompt)])
        .await
        .map_err(|e| AppError::Llm(format!("CV rendering failed: {e}")))?;

    Ok(Json(RenderHtmlResponse {
        html: strip_code_fences(&reply, "html").to_string(),
    }))
}

async fn resolve_cv(state: &AppState, request: CvSelector) -> Result<StructuredCv, AppError> {
    match request.cv {
        Some(cv) => Ok(cv),
        None => state.store.last_cv().await.ok_or_else(|| {
            AppError::NotFound("No structured CV available; parse one first".to_string())
        }),
    }
}
