//! Session entity and transcript wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::advisor::persona::PersonaKind;
use crate::llm_client::{Conversation, Role};

/// Operating mode, fixed at creation. Determines the persona family and the
/// follow-up suggestion set for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    ResumeGrounded,
    GeneralAdvisor,
}

/// One entry of the locally mirrored transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptTurn {
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A live advisor session. Owned by the store behind a per-session mutex;
/// all mutation goes through the engine while that lock is held.
#[derive(Debug)]
pub struct Session {
    pub session_id: Uuid,
    pub persona: PersonaKind,
    pub mode: SessionMode,
    pub resume_text: Option<String>,
    /// Upstream handle. Append-only; records completed exchanges only.
    pub conversation: Conversation,
    /// Client-facing mirror. One welcome entry plus two entries per exchange.
    pub transcript: Vec<TranscriptTurn>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(
        session_id: Uuid,
        persona: PersonaKind,
        resume_text: Option<String>,
        conversation: Conversation,
        welcome_message: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            persona,
            mode: persona.mode(),
            resume_text,
            conversation,
            transcript: vec![TranscriptTurn::now(Role::Assistant, welcome_message)],
            created_at: now,
            last_activity: now,
        }
    }

    /// Mirrors one exchange into the transcript, in user-then-assistant order.
    pub fn record_turns(&mut self, user_message: &str, assistant_reply: &str) {
        self.transcript
            .push(TranscriptTurn::now(Role::User, user_message));
        self.transcript
            .push(TranscriptTurn::now(Role::Assistant, assistant_reply));
        self.last_activity = Utc::now();
    }
}

/// Session metadata for the info endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub persona: PersonaKind,
    pub mode: SessionMode,
    pub message_count: usize,
    pub has_resume: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl SessionInfo {
    pub fn of(session: &Session) -> Self {
        Self {
            session_id: session.session_id,
            persona: session.persona,
            mode: session.mode,
            message_count: session.transcript.len(),
            has_resume: session.resume_text.is_some(),
            created_at: session.created_at,
            last_activity: session.last_activity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(persona: PersonaKind, resume: Option<&str>) -> Session {
        let conversation = Conversation::new("system", persona.seed_turns(resume));
        Session::new(
            Uuid::new_v4(),
            persona,
            resume.map(String::from),
            conversation,
            "welcome",
        )
    }

    #[test]
    fn test_new_session_has_single_welcome_entry() {
        let session = make_session(PersonaKind::ResumeAnalyst, Some("resume"));
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.transcript[0].role, Role::Assistant);
        assert_eq!(session.transcript[0].content, "welcome");
        assert_eq!(session.mode, SessionMode::ResumeGrounded);
    }

    #[test]
    fn test_record_turns_appends_user_then_assistant() {
        let mut session = make_session(PersonaKind::CareerStrategist, None);
        session.record_turns("question", "answer");
        assert_eq!(session.transcript.len(), 3);
        assert_eq!(session.transcript[1].role, Role::User);
        assert_eq!(session.transcript[1].content, "question");
        assert_eq!(session.transcript[2].role, Role::Assistant);
        assert_eq!(session.transcript[2].content, "answer");
    }

    #[test]
    fn test_session_info_reflects_state() {
        let mut session = make_session(PersonaKind::HrConsultant, Some("resume"));
        session.record_turns("q", "a");
        let info = SessionInfo::of(&session);
        assert_eq!(info.message_count, 3);
        assert!(info.has_resume);
        assert_eq!(info.mode, SessionMode::ResumeGrounded);
        assert_eq!(info.persona, PersonaKind::HrConsultant);
    }

    #[test]
    fn test_mode_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionMode::ResumeGrounded).unwrap(),
            "\"resume_grounded\""
        );
        assert_eq!(
            serde_json::to_string(&SessionMode::GeneralAdvisor).unwrap(),
            "\"general_advisor\""
        );
    }
}
