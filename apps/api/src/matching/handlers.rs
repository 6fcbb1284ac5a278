//! Axum route handlers for resume/job matching and role ranking.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::extract::upload::{resume_field, text_field};
use crate::matching::{RoleMatch, DEFAULT_TOP_K};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    /// Similarity percentage in [0, 100].
    pub match_score: f64,
}

#[derive(Debug, Serialize)]
pub struct RoleSuggestResponse {
    pub roles: Vec<RoleMatch>,
}

/// POST /api/v1/match
///
/// Multipart: `resume_file` (document upload) + `job_description` (text).
pub async fn handle_match(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let mut resume_text: Option<String> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume_file") => resume_text = Some(resume_field(field).await?),
            Some("job_description") => job_description = Some(text_field(field).await?),
            _ => {}
        }
    }

    let resume_text =
        resume_text.ok_or_else(|| AppError::Validation("resume_file is required".to_string()))?;
    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;

    let match_score = state.scorer.score(&resume_text, &job_description).await?;
    Ok(Json(MatchResponse { match_score }))
}

/// POST /api/v1/roles/suggest
///
/// Multipart: `resume_file`. Ranks the fixed role catalog against the resume.
pub async fn handle_suggest_roles(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RoleSuggestResponse>, AppError> {
    let mut resume_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        if name.as_deref() == Some("resume_file") {
            resume_text = Some(resume_field(field).await?);
        }
    }

    let resume_text =
        resume_text.ok_or_else(|| AppError::Validation("resume_file is required".to_string()))?;

    let roles = state.scorer.rank_roles(&resume_text, DEFAULT_TOP_K).await?;
    Ok(Json(RoleSuggestResponse { roles }))
}
