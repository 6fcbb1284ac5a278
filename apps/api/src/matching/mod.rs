//! Similarity scoring — pluggable, trait-based scorer for resume/job
//! matching and role-catalog ranking.
//!
//! Default: `TfCosineScorer` (pure-Rust, fast, deterministic, fully
//! testable). `AppState` holds an `Arc<dyn MatchScorer>`, so an
//! embedding-backed scorer can be swapped in at startup without touching
//! the endpoint, handler, or caller code.

pub mod handlers;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Fixed catalog ranked against resumes by `rank_roles`.
pub const ROLE_CATALOG: [&str; 6] = [
    "Data Scientist",
    "ML Engineer",
    "Cloud Engineer",
    "DevOps Engineer",
    "Business Analyst",
    "Software Engineer",
];

/// Number of catalog roles returned by default.
pub const DEFAULT_TOP_K: usize = 3;

/// One ranked catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMatch {
    pub role: String,
    /// Cosine similarity in [0, 1], rounded to 3 decimal places.
    pub score: f64,
}

/// The similarity seam. Implement this to swap scoring backends.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    /// Similarity between two texts as a percentage in [0, 100],
    /// rounded to 2 decimal places.
    async fn score(&self, text_a: &str, text_b: &str) -> Result<f64, AppError>;

    /// Ranks the fixed role catalog against a resume, best first.
    async fn rank_roles(&self, resume_text: &str, top_k: usize) -> Result<Vec<RoleMatch>, AppError>;
}

/// Pure-Rust term-frequency cosine scorer. Deterministic, no model call.
///
/// Texts are lowercased, split on non-alphanumeric boundaries, and compared
/// as term-frequency vectors. Good enough to order candidates; an embedding
/// backend can replace it behind the same trait.
pub struct TfCosineScorer;

#[async_trait]
impl MatchScorer for TfCosineScorer {
    async fn score(&self, text_a: &str, text_b: &str) -> Result<f64, AppError> {
        let similarity = cosine_similarity(&term_frequencies(text_a), &term_frequencies(text_b));
        Ok((similarity * 100.0 * 100.0).round() / 100.0)
    }

    async fn rank_roles(
        &self,
        resume_text: &str,
        top_k: usize,
    ) -> Result<Vec<RoleMatch>, AppError> {
        let resume = term_frequencies(resume_text);
        let mut matches: Vec<RoleMatch> = ROLE_CATALOG
            .iter()
            .map(|role| {
                let similarity = cosine_similarity(&resume, &term_frequencies(role));
                RoleMatch {
                    role: role.to_string(),
                    score: (similarity * 1000.0).round() / 1000.0,
                }
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }
}

fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let mut counts: HashMap<String, f64> = HashMap::new();
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *counts.entry(token.to_string()).or_insert(0.0) += 1.0;
    }
    counts
}

fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, weight)| b.get(term).map(|other| weight * other))
        .sum();
    let norm_a: f64 = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
