//! Conversation state
//!
//! A single pending question replaces the loose expecting-response flag,
//! last-question tag and current trivia question: a trivia question can
//! only exist while an answer is awaited.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::trivia::TriviaQuestion;

/// Which question the next utterance is expected to answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingQuestion {
    /// "What should I call you?"
    Name,
    /// "How are you doing?"
    HowAreYou,
    /// "Would you like to hear another one?"
    AnotherJoke,
    /// A trivia question and when it was asked
    AnswerQuestion {
        question: TriviaQuestion,
        asked_at: DateTime<Utc>,
    },
}

impl PendingQuestion {
    /// Short tag for logging
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::HowAreYou => "how_are_you",
            Self::AnotherJoke => "another_joke",
            Self::AnswerQuestion { .. } => "answer_question",
        }
    }
}

/// Mutable per-session conversation state
#[derive(Debug, Clone)]
pub struct ConversationState {
    pending: Option<PendingQuestion>,
    user_name: Option<String>,
    session_start: DateTime<Utc>,
    how_are_you_asked: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Fresh state with the session starting now
    #[must_use]
    pub fn new() -> Self {
        Self::with_session_start(Utc::now())
    }

    #[must_use]
    pub const fn with_session_start(session_start: DateTime<Utc>) -> Self {
        Self {
            pending: None,
            user_name: None,
            session_start,
            how_are_you_asked: false,
        }
    }

    /// Whether an answer to a question is awaited
    #[must_use]
    pub const fn expecting_response(&self) -> bool {
        self.pending.is_some()
    }

    /// Tag of the pending question
    #[must_use]
    pub fn last_question(&self) -> Option<&'static str> {
        self.pending.as_ref().map(PendingQuestion::tag)
    }

    /// Trivia question awaiting an answer
    #[must_use]
    pub const fn current_question(&self) -> Option<&TriviaQuestion> {
        match &self.pending {
            Some(PendingQuestion::AnswerQuestion { question, .. }) => Some(question),
            _ => None,
        }
    }

    /// When the current trivia question was asked
    #[must_use]
    pub const fn question_start_time(&self) -> Option<DateTime<Utc>> {
        match &self.pending {
            Some(PendingQuestion::AnswerQuestion { asked_at, .. }) => Some(*asked_at),
            _ => None,
        }
    }

    /// Expect the next utterance to answer `question`
    ///
    /// Asking how the user is also marks that topic as covered for the
    /// session.
    pub fn arm(&mut self, question: PendingQuestion) {
        if question == PendingQuestion::HowAreYou {
            self.how_are_you_asked = true;
        }
        tracing::debug!(question = question.tag(), "awaiting answer");
        self.pending = Some(question);
    }

    /// Consume the pending question
    pub const fn take_pending(&mut self) -> Option<PendingQuestion> {
        self.pending.take()
    }

    /// Drop any pending question
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::debug!(name = %name, "user name learned");
        self.user_name = Some(name);
    }

    #[must_use]
    pub const fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    /// Seconds since the session started, as of `now`
    #[must_use]
    pub fn session_elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.session_start).num_seconds()
    }

    /// Whether "how are you" was asked this session
    #[must_use]
    pub const fn how_are_you_asked(&self) -> bool {
        self.how_are_you_asked
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn trivia() -> TriviaQuestion {
        TriviaQuestion::new("What is the capital of France?", "paris", 10)
    }

    #[test]
    fn test_new_state_is_idle() {
        let state = ConversationState::new();
        assert!(!state.expecting_response());
        assert_eq!(state.last_question(), None);
        assert!(state.current_question().is_none());
        assert!(state.question_start_time().is_none());
        assert!(state.user_name().is_none());
        assert!(!state.how_are_you_asked());
    }

    #[test]
    fn test_arm_and_take() {
        let mut state = ConversationState::new();
        state.arm(PendingQuestion::Name);
        assert!(state.expecting_response());
        assert_eq!(state.last_question(), Some("name"));
        assert!(state.current_question().is_none());

        assert_eq!(state.take_pending(), Some(PendingQuestion::Name));
        assert!(!state.expecting_response());
        assert_eq!(state.take_pending(), None);
    }

    #[test]
    fn test_trivia_question_implies_pending_answer() {
        let mut state = ConversationState::new();
        let asked_at = Utc::now();
        state.arm(PendingQuestion::AnswerQuestion {
            question: trivia(),
            asked_at,
        });

        assert!(state.expecting_response());
        assert_eq!(state.last_question(), Some("answer_question"));
        assert_eq!(state.current_question(), Some(&trivia()));
        assert_eq!(state.question_start_time(), Some(asked_at));

        state.clear_pending();
        assert!(state.current_question().is_none());
    }

    #[test]
    fn test_how_are_you_marks_topic() {
        let mut state = ConversationState::new();
        state.arm(PendingQuestion::HowAreYou);
        state.clear_pending();
        assert!(state.how_are_you_asked());
    }

    #[test]
    fn test_session_elapsed() {
        let start = Utc::now();
        let state = ConversationState::with_session_start(start);
        assert_eq!(state.session_elapsed_secs(start + Duration::seconds(90)), 90);
    }

    #[test]
    fn test_user_name() {
        let mut state = ConversationState::new();
        state.set_user_name("Alex");
        assert_eq!(state.user_name(), Some("Alex"));
    }
}
