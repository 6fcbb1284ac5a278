//! Persona variants for advisor sessions.
//!
//! A persona fixes the assistant's role for the lifetime of a session: its
//! seed instructions, the synthetic acknowledgment that completes the seed,
//! the welcome prompt, and the follow-up suggestion table.

use serde::{Deserialize, Serialize};

use crate::advisor::session::SessionMode;
use crate::llm_client::ChatTurn;

/// Follow-up suggestions for resume-grounded sessions.
pub const RESUME_SUGGESTIONS: [&str; 4] = [
    "Perform Gap Analysis",
    "Suggest Interview Questions",
    "Rewrite this section",
    "What skills am I missing?",
];

/// Follow-up suggestions for general-advice sessions.
pub const GENERAL_SUGGESTIONS: [&str; 4] = [
    "Suggest other roles",
    "What skills are needed?",
    "How to prepare for interviews?",
    "Tell me about industry trends",
];

/// Static welcome used whenever welcome generation fails. Mode-agnostic so
/// session creation never depends on the upstream being reachable.
pub const FALLBACK_WELCOME: &str = "Hello! I am the Intelligent Career Analyzer (ICA). \
    My AI service is slightly delayed at the moment due to high traffic, but I am ready \
    to help you with your career and resume needs. Please try asking a question!";

const RESUME_ANALYST_INSTRUCTIONS: &str = "\
You are the \"Intelligent Career Analyzer\" (ICA) - Resume Specialist.
FOCUS: Gap Analysis, Resume Rewriting, and Skill Extraction.

You have a resume context. Use it to:
1. **Gap Analyzer**: Compare their specific skills against target roles.
2. **Resume Rewriter**: Rewrite sections for impact.
3. **Skill Extractor**: List their hard/soft skills.

Ground every statement strictly in the supplied resume. Never invent facts
that are not present in it; if information is missing, say so explicitly.
Be precise, honest, and constructive.";

const CAREER_STRATEGIST_INSTRUCTIONS: &str = "\
You are the \"Intelligent Career Analyzer\" (ICA) - Career Strategist.
FOCUS: Career mapping, Role suggestions, and Industry trends.

You DO NOT have a resume. Ask probing questions to understand the user's:
- Interests and passions
- Current expertise level
- Career goals

Then provide:
1. **Role Suggestions**: Recommend paths based on their answers.
2. **Career Advice**: General guidance on industries and growth.";

const HR_CONSULTANT_INSTRUCTIONS: &str = "\
You are a helpful HR consultant reviewing a candidate's resume.

Answer questions based ONLY on the resume context below. If the resume does
not contain the information asked for, say so politely instead of guessing.
Keep answers factual and recruiter-friendly.";

/// The persona selected at session creation. Immutable for the session's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
    /// Resume-grounded toolkit persona: gap analysis, rewriting, skills.
    ResumeAnalyst,
    /// No resume context; interviews the user before recommending roles.
    CareerStrategist,
    /// Resume-grounded recruiter-style Q&A persona.
    HrConsultant,
}

impl PersonaKind {
    /// Parses the wire name used by the session-creation endpoint.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "resume_analyst" => Some(Self::ResumeAnalyst),
            "career_strategist" => Some(Self::CareerStrategist),
            "hr_consultant" => Some(Self::HrConsultant),
            _ => None,
        }
    }

    /// Resolves the persona for a new session. An explicit request wins when
    /// it is compatible with the presence of resume text; a resume-grounded
    /// persona without a resume falls back to the strategist.
    pub fn resolve(requested: Option<PersonaKind>, has_resume: bool) -> Self {
        match requested {
            Some(p) if p.requires_resume() == has_resume => p,
            _ if has_resume => Self::ResumeAnalyst,
            _ => Self::CareerStrategist,
        }
    }

    pub fn mode(self) -> SessionMode {
        match self {
            Self::ResumeAnalyst | Self::HrConsultant => SessionMode::ResumeGrounded,
            Self::CareerStrategist => SessionMode::GeneralAdvisor,
        }
    }

    pub fn requires_resume(self) -> bool {
        self.mode() == SessionMode::ResumeGrounded
    }

    /// Builds the deterministic seed: persona instructions (plus resume, if
    /// any) as the first user turn, then the synthetic assistant ack.
    pub fn seed_turns(self, resume_text: Option<&str>) -> Vec<ChatTurn> {
        let instructions = match resume_text {
            Some(resume) => format!("{}\n\nRESUME:\n{}", self.instructions(), resume),
            None => self.instructions().to_string(),
        };
        vec![
            ChatTurn::user(instructions),
            ChatTurn::assistant(self.acknowledgment()),
        ]
    }

    fn instructions(self) -> &'static str {
        match self {
            Self::ResumeAnalyst => RESUME_ANALYST_INSTRUCTIONS,
            Self::CareerStrategist => CAREER_STRATEGIST_INSTRUCTIONS,
            Self::HrConsultant => HR_CONSULTANT_INSTRUCTIONS,
        }
    }

    fn acknowledgment(self) -> &'static str {
        match self {
            Self::ResumeAnalyst => {
                "Resume analyzed. Ready for Gap Analysis, Rewriting, and Skill Extraction."
            }
            Self::CareerStrategist => "Ready to advise on career paths and roles.",
            Self::HrConsultant => {
                "Understood. I have analyzed the resume and I am ready to answer questions about it."
            }
        }
    }

    /// One-off prompt used to generate the session's welcome message.
    pub fn welcome_prompt(self) -> &'static str {
        match self {
            Self::ResumeAnalyst => {
                "Briefly summarize the candidate's profile and list the 3 toolkit \
                 features (Gap Analysis, Rewrite, Skills) as ready."
            }
            Self::CareerStrategist => {
                "Introduce yourself as the ICA Career Strategist. Ask the user about \
                 their current field or interests to start suggesting roles."
            }
            Self::HrConsultant => {
                "Generate a short, friendly welcome message mentioning the candidate's \
                 name if found in the resume."
            }
        }
    }

    /// The fixed follow-up suggestion table. Keyed by mode so the two
    /// literal sets never mix: both resume-grounded personas share one set.
    pub fn suggestions(self) -> Vec<String> {
        let set = match self.mode() {
            SessionMode::ResumeGrounded => &RESUME_SUGGESTIONS,
            SessionMode::GeneralAdvisor => &GENERAL_SUGGESTIONS,
        };
        set.iter().map(|s| s.to_string()).collect()
    }
}
