//! Dialogue manager
//!
//! Turns a recognized utterance into a contextual response: classify the
//! intent, resolve any pending question, dispatch on the intent, record the
//! interaction and optionally ask a follow-up question.

mod follow_up;
mod respond;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::DialogueConfig;
use crate::fallback::Fallback;
use crate::history::{History, InteractionRecord};
use crate::intent::{Intent, IntentMatcher, MatchResult};
use crate::names::NameExtractor;
use crate::state::ConversationState;
use crate::{Error, Result};

/// Response produced for one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to speak
    pub text: String,
    /// Whether the caller should consult the follow-up scheduler
    pub should_follow_up: bool,
    /// Intent the response was produced for, after pending-question
    /// resolution (an accepted "another joke?" becomes `joke`)
    pub intent: Option<Intent>,
}

/// Everything that happened while processing one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub utterance: Option<String>,
    pub language: String,
    pub intent: Option<Intent>,
    pub confidence: u8,
    pub response: String,
    /// Proactive question asked after the response
    pub follow_up: Option<String>,
    /// The user asked to end the conversation
    pub should_exit: bool,
}

/// Stateful conversational core
///
/// Owns the conversation state and rolling history. Every random choice
/// draws from `R`, so a seeded generator makes a session reproducible.
pub struct DialogueManager<R = StdRng> {
    config: DialogueConfig,
    catalog: Catalog,
    matcher: IntentMatcher,
    names: NameExtractor,
    state: ConversationState,
    history: History,
    fallback: Option<Box<dyn Fallback>>,
    rng: R,
}

impl DialogueManager<StdRng> {
    /// Create a manager seeded from `config.seed`, or from entropy
    ///
    /// # Errors
    ///
    /// Returns error if the config is invalid or names a different default
    /// language than the catalog
    pub fn new(config: DialogueConfig, catalog: Catalog) -> Result<Self> {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::with_rng(config, catalog, rng)
    }
}

impl<R: Rng> DialogueManager<R> {
    /// Create a manager drawing random choices from `rng`
    ///
    /// # Errors
    ///
    /// Returns error if the config is invalid or names a different default
    /// language than the catalog
    pub fn with_rng(config: DialogueConfig, catalog: Catalog, rng: R) -> Result<Self> {
        config.validate()?;
        if config.default_language != catalog.default_language() {
            return Err(Error::Config(format!(
                "default language '{}' does not match catalog default '{}'",
                config.default_language,
                catalog.default_language()
            )));
        }

        let matcher = IntentMatcher::new(&catalog, config.similarity_threshold);
        let names = NameExtractor::new(&catalog);
        let history = History::new(config.history_capacity);

        tracing::debug!(
            threshold = config.similarity_threshold,
            history = config.history_capacity,
            language = %config.default_language,
            "dialogue manager ready"
        );

        Ok(Self {
            config,
            catalog,
            matcher,
            names,
            state: ConversationState::new(),
            history,
            fallback: None,
            rng,
        })
    }

    /// Hand unmatched utterances to `fallback`
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Fallback + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Classify an utterance without touching state
    #[must_use]
    pub fn classify(&self, utterance: &str, language: &str) -> MatchResult {
        self.matcher.match_utterance(utterance, language)
    }

    /// Process one utterance end to end
    ///
    /// Runs match, respond and record, then consults the follow-up
    /// scheduler when the response asks for it. `None` (nothing heard)
    /// yields the "didn't catch that" message and leaves state untouched.
    pub fn process(&mut self, utterance: Option<&str>, language: &str) -> Turn {
        let Some(utterance) = utterance.map(str::trim).filter(|u| !u.is_empty()) else {
            tracing::debug!(language, "no utterance");
            return Turn {
                utterance: None,
                language: language.to_string(),
                intent: None,
                confidence: 0,
                response: self.render("no_command", language, &[]),
                follow_up: None,
                should_exit: false,
            };
        };

        let MatchResult { intent, confidence } = self.matcher.match_utterance(utterance, language);
        let reply = self.respond(intent, utterance, language);
        self.record(utterance, language, reply.intent, confidence, &reply.text);

        let should_exit = reply.intent == Some(Intent::Exit);
        let follow_up = if reply.should_follow_up && !should_exit {
            self.maybe_follow_up(language)
        } else {
            None
        };

        Turn {
            utterance: Some(utterance.to_string()),
            language: language.to_string(),
            intent: reply.intent,
            confidence,
            response: reply.text,
            follow_up,
            should_exit,
        }
    }

    /// Append an interaction to the rolling history
    pub fn record(
        &mut self,
        utterance: &str,
        language: &str,
        intent: Option<Intent>,
        confidence: u8,
        response: &str,
    ) {
        self.history.push(InteractionRecord {
            timestamp: Utc::now(),
            utterance: utterance.to_string(),
            language: language.to_string(),
            intent,
            confidence,
            response: response.to_string(),
        });
    }

    /// "Shadow activated" announcement
    pub fn activated_message(&mut self, language: &str) -> String {
        self.render("activated_msg", language, &[])
    }

    /// Opening line of a session
    pub fn initial_greeting(&mut self, language: &str) -> String {
        self.render("initial_greeting", language, &[])
    }

    /// Tell the user which wake word to say
    pub fn wake_word_enabled_message(&mut self, wake_word: &str, language: &str) -> String {
        self.render("wake_word_enabled_msg", language, &[("wake_word", wake_word)])
    }

    /// Acknowledge a bare wake word
    pub fn wake_word_listening_message(&mut self, language: &str) -> String {
        self.render("wake_word_listening", language, &[])
    }

    /// Farewell when the session ends without an exit request
    pub fn goodbye_message(&mut self, language: &str) -> String {
        match self.state.user_name().map(str::to_owned) {
            Some(name) => self.render("goodbye_personalized", language, &[("name", name.as_str())]),
            None => self.render("goodbye_msg", language, &[]),
        }
    }

    /// Final line before the process stops
    pub fn shutdown_message(&mut self, language: &str) -> String {
        self.render("shutdown_msg", language, &[])
    }

    #[must_use]
    pub const fn state(&self) -> &ConversationState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut ConversationState {
        &mut self.state
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &DialogueConfig {
        &self.config
    }

    fn render(&mut self, key: &str, language: &str, params: &[(&str, &str)]) -> String {
        self.catalog.render(key, language, params, &mut self.rng)
    }

    /// Draw against a configured probability
    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}
