//! One-shot completion endpoint. Every call is scored into the interaction
//! log, which is what the dashboard and income derivation accumulate over.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::GENERATE_SYSTEM;
use crate::models::conversation::ChatMessage;
use crate::scoring::round2;
use crate::scoring::utmi::{build_record, InteractionSignals};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    #[serde(default)]
    pub complexity: f64,
    #[serde(default)]
    pub impact: f64,
    #[serde(default)]
    pub creativity: bool,
    #[serde(default)]
    pub unique_concept: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub text: String,
    pub utmi: f64,
    pub total_utmi: f64,
}

/// POST /api/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("prompt is required".to_string()))?;

    let reply = state
        .llm
        .complete(GENERATE_SYSTEM, &[ChatMessage::user(prompt)])
        .await
        .map_err(|e| AppError::Llm(format!("Completion failed: {e}")))?;

    let signals = InteractionSignals {
        complexity: request.complexity,
        impact: request.impact,
        creativity: request.creativity,
        unique_concept: request.unique_concept,
    };
    // The whole prompt/response cycle is what gets valued.
    let record = build_record(format!("{prompt}\n\n{reply}"), signals, &state.profile);
    let utmi = record.utmi;
    state.store.append_interaction(record).await;

    let totals = state.store.log_totals().await;

    Ok(Json(GenerateResponse {
        text: reply,
        utmi: round2(utmi),
        total_utmi: round2(totals.total_utmi),
    }))
}
