use std::sync::Arc;

use crate::advisor::AdvisorEngine;
use crate::matching::MatchScorer;
use crate::tools::ResumeTools;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: AdvisorEngine,
    pub tools: Arc<ResumeTools>,
    /// Pluggable similarity scorer. Default: TfCosineScorer.
    pub scorer: Arc<dyn MatchScorer>,
}
