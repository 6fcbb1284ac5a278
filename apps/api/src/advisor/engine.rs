//! The Conversation Engine — session lifecycle, message exchange, and the
//! degradation policies that keep the chat surface alive when the upstream
//! model is not.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::advisor::persona::{PersonaKind, FALLBACK_WELCOME};
use crate::advisor::session::{Session, SessionInfo, TranscriptTurn};
use crate::advisor::store::SessionStore;
use crate::errors::AppError;
use crate::llm_client::{prompts::ADVISOR_SYSTEM, Conversation, ModelClient};

/// Answer substituted when an exchange fails upstream. The raw error never
/// reaches the transcript as fact; it travels in the diagnostic field.
pub const UPSTREAM_APOLOGY: &str = "I encountered an error communicating with the AI \
    service. Please try again in a moment.";

/// Result of a successful session creation.
#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub welcome_message: String,
    pub suggestions: Vec<String>,
}

/// Result of a message exchange. `valid` is false only for unknown session
/// ids; upstream failures keep `valid=true` with an apology answer and the
/// underlying cause in `error`.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub suggestions: Vec<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    fn session_not_found() -> Self {
        Self {
            answer: String::new(),
            suggestions: Vec::new(),
            valid: false,
            error: Some("Session not found".to_string()),
        }
    }
}

/// Owns session creation, persona seeding, upstream exchange, transcript
/// mirroring, and suggestion tables. Cheap to clone; the store and client
/// are shared.
#[derive(Clone)]
pub struct AdvisorEngine {
    model: Arc<dyn ModelClient>,
    store: Arc<SessionStore>,
}

impl AdvisorEngine {
    /// Fails fast if the upstream client has no credential. This is the only
    /// fatal error class; everything past construction degrades per call.
    pub fn new(model: Arc<dyn ModelClient>, store: Arc<SessionStore>) -> Result<Self, AppError> {
        if !model.is_configured() {
            return Err(AppError::Configuration(
                "upstream model credential is missing".to_string(),
            ));
        }
        Ok(Self { model, store })
    }

    /// Starts a new session. Resume text selects the resume-grounded mode;
    /// an explicit persona request is honored when compatible. The seeded
    /// context is injected deterministically; only the welcome message
    /// involves a model call, and its failure falls back to a static
    /// welcome rather than failing creation.
    pub async fn create_session(
        &self,
        resume_text: Option<String>,
        requested_persona: Option<PersonaKind>,
    ) -> SessionCreated {
        let resume_text = resume_text.filter(|t| !t.trim().is_empty());
        let persona = PersonaKind::resolve(requested_persona, resume_text.is_some());
        let session_id = Uuid::new_v4();

        let mut conversation =
            Conversation::new(ADVISOR_SYSTEM, persona.seed_turns(resume_text.as_deref()));

        let welcome_prompt = persona.welcome_prompt();
        let welcome_result = self
            .model
            .exchange(ADVISOR_SYSTEM, conversation.turns(), welcome_prompt)
            .await;
        let welcome_message = match welcome_result {
            Ok(text) => {
                conversation.record_exchange(welcome_prompt, &text);
                text
            }
            Err(e) => {
                warn!("Welcome generation failed for session {session_id}: {e}");
                FALLBACK_WELCOME.to_string()
            }
        };

        let session = Session::new(
            session_id,
            persona,
            resume_text,
            conversation,
            &welcome_message,
        );
        self.store.insert(session).await;

        info!(
            "Created advisor session {session_id} (persona: {persona:?}, sessions: {})",
            self.store.len()
        );

        SessionCreated {
            session_id,
            welcome_message,
            suggestions: persona.suggestions(),
        }
    }

    /// Forwards one user message on the session's conversation handle.
    ///
    /// The session mutex is held across the upstream round trip, so at most
    /// one exchange is in flight per session; the guard is released on every
    /// exit path. Unknown ids are reported, not thrown.
    pub async fn send_message(&self, session_id: Uuid, user_message: &str) -> ChatReply {
        let Some(shared) = self.store.get(&session_id) else {
            return ChatReply::session_not_found();
        };

        let mut session = shared.lock().await;
        let suggestions = session.persona.suggestions();

        let result = self
            .model
            .exchange(
                session.conversation.system(),
                session.conversation.turns(),
                user_message,
            )
            .await;

        match result {
            Ok(answer) => {
                session.conversation.record_exchange(user_message, &answer);
                session.record_turns(user_message, &answer);
                ChatReply {
                    answer,
                    suggestions,
                    valid: true,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Exchange failed for session {session_id}: {e}");
                // The upstream handle stays untouched — it records completed
                // exchanges only. The mirror still shows the user's turn,
                // answered by the apology.
                session.record_turns(user_message, UPSTREAM_APOLOGY);
                ChatReply {
                    answer: UPSTREAM_APOLOGY.to_string(),
                    suggestions,
                    valid: true,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Full mirrored transcript; empty for unknown ids.
    pub async fn get_history(&self, session_id: Uuid) -> Vec<TranscriptTurn> {
        match self.store.get(&session_id) {
            Some(shared) => shared.lock().await.transcript.clone(),
            None => Vec::new(),
        }
    }

    /// Session metadata; `None` for unknown ids.
    pub async fn session_info(&self, session_id: Uuid) -> Option<SessionInfo> {
        let shared = self.store.get(&session_id)?;
        let session = shared.lock().await;
        Some(SessionInfo::of(&session))
    }

    /// Idempotent removal.
    pub fn clear_session(&self, session_id: Uuid) {
        if self.store.remove(&session_id) {
            info!("Cleared advisor session {session_id}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::persona::{GENERAL_SUGGESTIONS, RESUME_SUGGESTIONS};
    use crate::advisor::session::SessionMode;
    use crate::llm_client::{ChatTurn, LlmError, Role};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Replies with an echo of the incoming message.
    struct EchoClient;

    #[async_trait]
    impl ModelClient for EchoClient {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            Ok(format!("echo: {prompt}"))
        }

        async fn exchange(
            &self,
            _system: &str,
            _turns: &[ChatTurn],
            message: &str,
        ) -> Result<String, LlmError> {
            Ok(format!("echo: {message}"))
        }
    }

    /// Fails every call with a quota-style error.
    struct FailingClient;

    #[async_trait]
    impl ModelClient for FailingClient {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            })
        }

        async fn exchange(
            &self,
            _system: &str,
            _turns: &[ChatTurn],
            _message: &str,
        ) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            })
        }
    }

    /// Succeeds until `fail` is flipped, then fails every call.
    struct SwitchableClient {
        fail: AtomicBool,
    }

    impl SwitchableClient {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ModelClient for SwitchableClient {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
            self.exchange(system, &[], prompt).await
        }

        async fn exchange(
            &self,
            _system: &str,
            _turns: &[ChatTurn],
            message: &str,
        ) -> Result<String, LlmError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(LlmError::Api {
                    status: 500,
                    message: "upstream down".to_string(),
                })
            } else {
                Ok(format!("echo: {message}"))
            }
        }
    }

    /// Records the maximum number of concurrently in-flight exchanges.
    struct ProbeClient {
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
    }

    impl ProbeClient {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_seen: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ModelClient for ProbeClient {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
            self.exchange(system, &[], prompt).await
        }

        async fn exchange(
            &self,
            _system: &str,
            _turns: &[ChatTurn],
            message: &str,
        ) -> Result<String, LlmError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(25)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("echo: {message}"))
        }
    }

    struct UnconfiguredClient;

    #[async_trait]
    impl ModelClient for UnconfiguredClient {
        fn is_configured(&self) -> bool {
            false
        }

        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }

        async fn exchange(
            &self,
            _system: &str,
            _turns: &[ChatTurn],
            _message: &str,
        ) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    fn engine_with(model: Arc<dyn ModelClient>) -> AdvisorEngine {
        AdvisorEngine::new(model, Arc::new(SessionStore::new(100))).unwrap()
    }

    #[test]
    fn test_construction_fails_without_credentials() {
        let result = AdvisorEngine::new(
            Arc::new(UnconfiguredClient),
            Arc::new(SessionStore::new(100)),
        );
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_resume_session_happy_path() {
        let engine = engine_with(Arc::new(EchoClient));
        let created = engine
            .create_session(Some("Experienced Python backend engineer...".to_string()), None)
            .await;

        assert!(!created.welcome_message.is_empty());
        assert_eq!(created.suggestions, RESUME_SUGGESTIONS.map(String::from).to_vec());

        let history = engine.get_history(created.session_id).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::Assistant);

        let reply = engine
            .send_message(
                created.session_id,
                "Perform gap analysis for Senior Engineer role",
            )
            .await;
        assert!(reply.valid);
        assert!(reply.error.is_none());
        assert_eq!(engine.get_history(created.session_id).await.len(), 3);
    }

    #[tokio::test]
    async fn test_general_session_happy_path() {
        let engine = engine_with(Arc::new(EchoClient));
        let created = engine.create_session(None, None).await;

        assert_eq!(
            created.suggestions,
            GENERAL_SUGGESTIONS.map(String::from).to_vec()
        );
        assert_eq!(engine.get_history(created.session_id).await.len(), 1);

        let info = engine.session_info(created.session_id).await.unwrap();
        assert_eq!(info.mode, SessionMode::GeneralAdvisor);
        assert!(!info.has_resume);
    }

    #[tokio::test]
    async fn test_blank_resume_text_selects_general_mode() {
        let engine = engine_with(Arc::new(EchoClient));
        let created = engine.create_session(Some("   \n".to_string()), None).await;
        let info = engine.session_info(created.session_id).await.unwrap();
        assert_eq!(info.mode, SessionMode::GeneralAdvisor);
    }

    #[tokio::test]
    async fn test_mode_immutable_across_exchanges() {
        let engine = engine_with(Arc::new(EchoClient));
        let created = engine
            .create_session(Some("resume".to_string()), None)
            .await;

        for i in 0..5 {
            engine
                .send_message(created.session_id, &format!("message {i}"))
                .await;
            let info = engine.session_info(created.session_id).await.unwrap();
            assert_eq!(info.mode, SessionMode::ResumeGrounded);
            assert_eq!(info.persona, PersonaKind::ResumeAnalyst);
        }
    }

    #[tokio::test]
    async fn test_transcript_growth_is_one_plus_two_k() {
        let engine = engine_with(Arc::new(EchoClient));
        let created = engine.create_session(None, None).await;

        for k in 1..=4 {
            engine
                .send_message(created.session_id, &format!("message {k}"))
                .await;
            assert_eq!(
                engine.get_history(created.session_id).await.len(),
                1 + 2 * k
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_session_is_reported_not_thrown() {
        let engine = engine_with(Arc::new(EchoClient));
        let bogus = Uuid::new_v4();

        let reply = engine.send_message(bogus, "hi").await;
        assert!(!reply.valid);
        assert!(reply.error.is_some());
        assert!(reply.suggestions.is_empty());

        assert!(engine.get_history(bogus).await.is_empty());
        assert!(engine.session_info(bogus).await.is_none());
    }

    #[tokio::test]
    async fn test_fallback_welcome_when_upstream_is_down() {
        let engine = engine_with(Arc::new(FailingClient));
        let created = engine
            .create_session(Some("resume".to_string()), None)
            .await;

        assert_eq!(created.welcome_message, FALLBACK_WELCOME);
        assert!(!created.welcome_message.is_empty());
        // Creation still succeeded: transcript has exactly the welcome entry.
        let history = engine.get_history(created.session_id).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, FALLBACK_WELCOME);
    }

    #[tokio::test]
    async fn test_upstream_outage_mid_session() {
        let client = Arc::new(SwitchableClient::new());
        let engine = engine_with(client.clone() as Arc<dyn ModelClient>);
        let created = engine
            .create_session(Some("resume".to_string()), None)
            .await;

        client.fail.store(true, Ordering::SeqCst);
        let reply = engine.send_message(created.session_id, "hello?").await;

        assert!(reply.valid);
        assert_eq!(reply.answer, UPSTREAM_APOLOGY);
        assert!(reply.error.unwrap().contains("upstream down"));

        // The user turn is mirrored; the assistant turn is the fallback text.
        let history = engine.get_history(created.session_id).await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[1].content, "hello?");
        assert_eq!(history[2].content, UPSTREAM_APOLOGY);

        // Recovery: the next message is the retry.
        client.fail.store(false, Ordering::SeqCst);
        let reply = engine.send_message(created.session_id, "still there?").await;
        assert!(reply.valid);
        assert_eq!(reply.answer, "echo: still there?");
        assert_eq!(engine.get_history(created.session_id).await.len(), 5);
    }

    #[tokio::test]
    async fn test_clear_then_reuse() {
        let engine = engine_with(Arc::new(EchoClient));
        let created = engine.create_session(None, None).await;

        engine.clear_session(created.session_id);
        assert!(engine.get_history(created.session_id).await.is_empty());

        let reply = engine.send_message(created.session_id, "hi").await;
        assert!(!reply.valid);

        // Clearing an already-absent session is not an error.
        engine.clear_session(created.session_id);
    }

    #[tokio::test]
    async fn test_same_session_exchanges_never_interleave() {
        let probe = Arc::new(ProbeClient::new());
        let engine = engine_with(probe.clone() as Arc<dyn ModelClient>);
        let created = engine
            .create_session(Some("resume".to_string()), None)
            .await;
        // Reset after the welcome call.
        probe.max_seen.store(0, Ordering::SeqCst);

        let e1 = engine.clone();
        let e2 = engine.clone();
        let id = created.session_id;
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { e1.send_message(id, "first").await }),
            tokio::spawn(async move { e2.send_message(id, "second").await }),
        );
        assert!(r1.unwrap().valid);
        assert!(r2.unwrap().valid);

        // At most one exchange in flight for a single session.
        assert_eq!(probe.max_seen.load(Ordering::SeqCst), 1);

        // Final order is one-complete-then-the-other: user/assistant pairs.
        let history = engine.get_history(id).await;
        assert_eq!(history.len(), 5);
        for pair in history[1..].chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
            assert_eq!(pair[1].content, format!("echo: {}", pair[0].content));
        }
    }

    #[tokio::test]
    async fn test_distinct_sessions_proceed_concurrently() {
        let probe = Arc::new(ProbeClient::new());
        let engine = engine_with(probe.clone() as Arc<dyn ModelClient>);
        let a = engine.create_session(None, None).await.session_id;
        let b = engine.create_session(None, None).await.session_id;
        probe.max_seen.store(0, Ordering::SeqCst);

        let e1 = engine.clone();
        let e2 = engine.clone();
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { e1.send_message(a, "to a").await }),
            tokio::spawn(async move { e2.send_message(b, "to b").await }),
        );
        assert!(r1.unwrap().valid);
        assert!(r2.unwrap().valid);

        // Two sessions may overlap upstream; serialization is per session.
        assert_eq!(probe.max_seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_exchange_does_not_touch_upstream_handle() {
        let client = Arc::new(SwitchableClient::new());
        let store = Arc::new(SessionStore::new(100));
        let engine =
            AdvisorEngine::new(client.clone() as Arc<dyn ModelClient>, store.clone()).unwrap();
        let created = engine.create_session(None, None).await;

        let handle = store.get(&created.session_id).unwrap();
        let seeded_len = handle.lock().await.conversation.len();

        client.fail.store(true, Ordering::SeqCst);
        engine.send_message(created.session_id, "lost").await;

        // Transcript mirrored the failed exchange; the upstream log did not.
        let session = handle.lock().await;
        assert_eq!(session.conversation.len(), seeded_len);
        assert_eq!(session.transcript.len(), 3);
    }

    #[tokio::test]
    async fn test_suggestions_stable_on_failure() {
        let client = Arc::new(SwitchableClient::new());
        let engine = engine_with(client.clone() as Arc<dyn ModelClient>);
        let created = engine
            .create_session(Some("resume".to_string()), None)
            .await;

        client.fail.store(true, Ordering::SeqCst);
        let reply = engine.send_message(created.session_id, "hi").await;
        assert_eq!(
            reply.suggestions,
            RESUME_SUGGESTIONS.map(String::from).to_vec()
        );
    }
}
