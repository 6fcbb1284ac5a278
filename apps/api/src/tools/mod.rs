//! Resume Tools — stateless, prompted structured-generation utilities.
//!
//! Each tool is a single prompt/parse round trip against the model client.
//! Parse failures and upstream failures never propagate: every tool returns
//! its documented default and logs the cause.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::errors::AppError;
use crate::llm_client::{prompts::JSON_ONLY_SYSTEM, strip_json_fences, ModelClient};
use crate::tools::prompts::{
    GAP_PROMPT_TEMPLATE, QA_PROMPT_TEMPLATE, QA_SYSTEM, REWRITE_PROMPT_TEMPLATE, REWRITE_SYSTEM,
    ROLES_PROMPT_TEMPLATE, SKILLS_PROMPT_TEMPLATE,
};

pub mod handlers;
pub mod prompts;

const SKILLS_TEXT_LIMIT: usize = 4000;
const GAP_TEXT_LIMIT: usize = 2000;
const ROLES_TEXT_LIMIT: usize = 3000;

/// Structured gap-analysis result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GapReport {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Overall resume/job fit, 0–100.
    pub score: u32,
}

/// Stateless prompting tools sharing one model client.
pub struct ResumeTools {
    model: Arc<dyn ModelClient>,
}

impl ResumeTools {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Extracts technical skills, soft skills, and tools from free text.
    /// Returns an empty list on any failure.
    pub async fn extract_skills(&self, text: &str) -> Vec<String> {
        let prompt =
            SKILLS_PROMPT_TEMPLATE.replace("{text}", truncate_chars(text, SKILLS_TEXT_LIMIT));
        self.call_json_or_default("Skill extraction", &prompt).await
    }

    /// Compares a resume against a job description. Returns the default
    /// (empty, score 0) report on any failure.
    pub async fn analyze_gap(&self, resume_text: &str, job_description: &str) -> GapReport {
        let prompt = GAP_PROMPT_TEMPLATE
            .replace(
                "{resume_text}",
                truncate_chars(resume_text, GAP_TEXT_LIMIT),
            )
            .replace(
                "{job_description}",
                truncate_chars(job_description, GAP_TEXT_LIMIT),
            );
        self.call_json_or_default("Gap analysis", &prompt).await
    }

    /// Rewrites a resume section to include the target keywords. Returns the
    /// original text unchanged on any failure.
    pub async fn rewrite_section(&self, text: &str, target_keywords: &[String]) -> String {
        let prompt = REWRITE_PROMPT_TEMPLATE
            .replace("{keywords}", &target_keywords.join(", "))
            .replace("{text}", text);
        match self.model.complete(REWRITE_SYSTEM, &prompt).await {
            Ok(rewritten) if !rewritten.trim().is_empty() => rewritten,
            Ok(_) => text.to_string(),
            Err(e) => {
                error!("Rewrite failed: {e}");
                text.to_string()
            }
        }
    }

    /// Suggests job titles for a resume. Returns an empty list on any failure.
    pub async fn suggest_roles(&self, resume_text: &str) -> Vec<String> {
        let prompt = ROLES_PROMPT_TEMPLATE.replace(
            "{resume_text}",
            truncate_chars(resume_text, ROLES_TEXT_LIMIT),
        );
        self.call_json_or_default("Role suggestion", &prompt).await
    }

    /// Extractive question answering grounded in the resume text. Unlike the
    /// JSON tools this surfaces upstream failure to the caller; there is no
    /// safe default answer to substitute.
    pub async fn answer_question(
        &self,
        resume_text: &str,
        question: &str,
    ) -> Result<String, AppError> {
        let prompt = QA_PROMPT_TEMPLATE
            .replace(
                "{resume_text}",
                truncate_chars(resume_text, SKILLS_TEXT_LIMIT),
            )
            .replace("{question}", question);
        self.model
            .complete(QA_SYSTEM, &prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Question answering failed: {e}")))
    }

    /// Shared call-then-parse path for the JSON tools. The model must be
    /// prompted to return bare JSON; fenced output is tolerated.
    async fn call_json_or_default<T: DeserializeOwned + Default>(
        &self,
        what: &str,
        prompt: &str,
    ) -> T {
        match self.model.complete(JSON_ONLY_SYSTEM, prompt).await {
            Ok(text) => match serde_json::from_str(strip_json_fences(&text)) {
                Ok(value) => value,
                Err(e) => {
                    error!("{what} returned unparseable JSON: {e}");
                    T::default()
                }
            },
            Err(e) => {
                error!("{what} failed: {e}");
                T::default()
            }
        }
    }
}

/// Truncates on a character boundary; prompt budgets are in characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
