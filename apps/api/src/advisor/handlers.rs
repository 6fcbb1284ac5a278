//! Axum route handlers for the advisor chat API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::advisor::persona::PersonaKind;
use crate::advisor::session::{SessionInfo, TranscriptTurn};
use crate::errors::AppError;
use crate::extract::upload::{resume_field, text_field};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub session_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub welcome_message: String,
    pub suggestions: Vec<String>,
    pub conversation_history: Vec<TranscriptTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub answer: String,
    pub suggestions: Vec<String>,
    pub session_valid: bool,
    pub conversation_history: Vec<TranscriptTurn>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub conversation_history: Vec<TranscriptTurn>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/advisor/session
///
/// Starts a session. A `resume_file` part selects resume-grounded mode; an
/// optional `persona` part requests a specific persona variant.
pub async fn handle_create_session(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SessionResponse>, AppError> {
    let mut resume_text: Option<String> = None;
    let mut persona: Option<PersonaKind> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume_file") => resume_text = Some(resume_field(field).await?),
            Some("persona") => {
                let value = text_field(field).await?;
                persona = Some(
                    PersonaKind::from_name(&value)
                        .ok_or_else(|| AppError::Validation(format!("Unknown persona '{value}'")))?,
                );
            }
            _ => {}
        }
    }

    let created = state.engine.create_session(resume_text, persona).await;
    let conversation_history = state.engine.get_history(created.session_id).await;

    Ok(Json(SessionResponse {
        session_id: created.session_id,
        welcome_message: created.welcome_message,
        suggestions: created.suggestions,
        conversation_history,
    }))
}

/// POST /api/v1/advisor/message
pub async fn handle_send_message(
    State(state): State<AppState>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let reply = state
        .engine
        .send_message(request.session_id, &request.message)
        .await;

    if !reply.valid {
        return Err(AppError::NotFound(
            reply
                .error
                .unwrap_or_else(|| "Session not found".to_string()),
        ));
    }

    let conversation_history = state.engine.get_history(request.session_id).await;

    Ok(Json(ChatMessageResponse {
        answer: reply.answer,
        suggestions: reply.suggestions,
        session_valid: true,
        conversation_history,
    }))
}

/// GET /api/v1/advisor/history/:session_id
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let conversation_history = state.engine.get_history(session_id).await;
    if conversation_history.is_empty() {
        return Err(AppError::NotFound("Session not found or empty".to_string()));
    }
    Ok(Json(HistoryResponse {
        conversation_history,
    }))
}

/// GET /api/v1/advisor/session/:session_id/info
pub async fn handle_session_info(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionInfo>, AppError> {
    state
        .engine
        .session_info(session_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

/// DELETE /api/v1/advisor/session/:session_id
pub async fn handle_clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Json<Value> {
    state.engine.clear_session(session_id);
    Json(json!({ "message": "Session cleared successfully" }))
}
