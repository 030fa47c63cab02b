//! Axum route handlers for the conversation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::CONVERSATION_SYSTEM;
use crate::models::conversation::{ChatMessage, Conversation, ConversationSummary};
use crate::scoring::utmi::{build_record, InteractionSignals};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversationResponse {
    pub id: Uuid,
    pub conversation: Conversation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub reply: String,
    pub conversation: Conversation,
}

/// POST /api/conversations/new
///
/// Creates a conversation seeded with the CVNU system message.
pub async fn handle_new(
    State(state): State<AppState>,
) -> Result<Json<NewConversationResponse>, AppError> {
    let conversation = state.store.create_conversation(CONVERSATION_SYSTEM).await;
    Ok(Json(NewConversationResponse {
        id: conversation.id,
        conversation,
    }))
}

/// GET /api/conversations
pub async fn handle_list(State(state): State<AppState>) -> Json<Vec<ConversationSummary>> {
    Json(state.store.list_conversation_summaries().await)
}

/// GET /api/conversations/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Conversation>, AppError> {
    state
        .store
        .get_conversation(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Conversation {id} not found")))
}

/// POST /api/conversations/:id/message
///
/// Appends the user message, replays the full history to the completion API,
/// appends the assistant reply, and scores the exchange into the interaction
/// log.
pub async fn handle_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation("message is required".to_string()))?;

    let conversation = state
        .store
        .append_message(id, ChatMessage::user(message))
        .await
        .ok_or_else(|| AppError::NotFound(format!("Conversation {id} not found")))?;

    // The seeded system message rides along in the history; the client folds
    // it into the system prompt.
    let reply = state
        .llm
        .complete("", &conversation.messages)
        .await
        .map_err(|e| AppError::Llm(format!("Completion failed: {e}")))?;

    let conversation = state
        .store
        .append_message(id, ChatMessage::assistant(reply.clone()))
        .await
        .ok_or_else(|| AppError::NotFound(format!("Conversation {id} not found")))?;

    let record = build_record(
        format!("{message}\n\n{reply}"),
        InteractionSignals::default(),
        &state.profile,
    );
    state.store.append_interaction(record).await;

    Ok(Json(MessageResponse {
        reply,
        conversation,
    }))
}

/// DELETE /api/conversations/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if state.store.delete_conversation(id).await {
        Ok(Json(json!({ "message": "Conversation deleted" })))
    } else {
        Err(AppError::NotFound(format!("Conversation {id} not found")))
    }
}
