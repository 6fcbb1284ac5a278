//! Axum route handlers for the stateless prompting tools.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::upload::{resume_field, text_field};
use crate::state::AppState;
use crate::tools::GapReport;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SkillsRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GapRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub text: String,
    #[serde(default)]
    pub target_keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    pub rewritten: String,
}

#[derive(Debug, Deserialize)]
pub struct RolesRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QaResponse {
    pub answer: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tools/skills
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    Json(request): Json<SkillsRequest>,
) -> Result<Json<SkillsResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let skills = state.tools.extract_skills(&request.text).await;
    Ok(Json(SkillsResponse { skills }))
}

/// POST /api/v1/tools/gap
pub async fn handle_analyze_gap(
    State(state): State<AppState>,
    Json(request): Json<GapRequest>,
) -> Result<Json<GapReport>, AppError> {
    if request.resume_text.trim().is_empty() || request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text and job_description are required".to_string(),
        ));
    }
    let report = state
        .tools
        .analyze_gap(&request.resume_text, &request.job_description)
        .await;
    Ok(Json(report))
}

/// POST /api/v1/tools/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Json(request): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let rewritten = state
        .tools
        .rewrite_section(&request.text, &request.target_keywords)
        .await;
    Ok(Json(RewriteResponse { rewritten }))
}

/// POST /api/v1/tools/roles
///
/// LLM-suggested job titles, as opposed to the catalog ranking at
/// /api/v1/roles/suggest.
pub async fn handle_suggest_roles(
    State(state): State<AppState>,
    Json(request): Json<RolesRequest>,
) -> Result<Json<RolesResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }
    let roles = state.tools.suggest_roles(&request.resume_text).await;
    Ok(Json(RolesResponse { roles }))
}

/// POST /api/v1/qa
///
/// Multipart: `resume_file` + `question`. Extractive answer grounded in the
/// uploaded resume.
pub async fn handle_qa(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<QaResponse>, AppError> {
    let mut resume_text: Option<String> = None;
    let mut question: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume_file") => resume_text = Some(resume_field(field).await?),
            Some("question") => question = Some(text_field(field).await?),
            _ => {}
        }
    }

    let resume_text =
        resume_text.ok_or_else(|| AppError::Validation("resume_file is required".to_string()))?;
    let question = question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::Validation("question is required".to_string()))?;

    let answer = state.tools.answer_question(&resume_text, &question).await?;
    Ok(Json(QaResponse { answer }))
}
