//! Configuration management for the Shadow assistant
//!
//! Values resolve env > TOML file > default.

pub mod file;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::trivia::{self, TriviaQuestion};
use crate::wake::WakeWordDetector;
use crate::{Error, Result};

/// Default minimum similarity for an intent match (0..=1)
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.65;

/// Default rolling history capacity
pub const DEFAULT_HISTORY_CAPACITY: usize = 8;

/// Default/fallback language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default session age before a proactive "how are you"
pub const DEFAULT_IDLE_THRESHOLD_SECS: u64 = 60;

/// Default seconds an activation waits for its command
pub const DEFAULT_WAKE_TIMEOUT_SECS: u64 = 10;

/// Shadow configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Dialogue core tunables
    pub dialogue: DialogueConfig,

    /// Wake word settings
    pub wake_word: WakeWordConfig,

    /// Directory of language packs overriding the embedded ones
    pub catalog_dir: Option<PathBuf>,
}

/// Tunables of the dialogue core
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// Minimum similarity (0..=1) for an intent match
    pub similarity_threshold: f64,

    /// Rolling history capacity (at least 1)
    pub history_capacity: usize,

    /// Language used when the utterance language is unsupported
    pub default_language: String,

    /// Session age before the follow-up scheduler may ask how the user is
    pub idle_threshold_secs: u64,

    /// Probabilities of the optional conversational moves
    pub probabilities: Probabilities,

    /// Trivia question bank
    pub trivia: Vec<TriviaQuestion>,

    /// Seed for the random source; entropy when unset
    pub seed: Option<u64>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_language: DEFAULT_LANGUAGE.to_string(),
            idle_threshold_secs: DEFAULT_IDLE_THRESHOLD_SECS,
            probabilities: Probabilities::default(),
            trivia: trivia::default_bank(),
            seed: None,
        }
    }
}

impl DialogueConfig {
    /// Check every tunable is in range
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be within 0..=1, got {}",
                self.similarity_threshold
            )));
        }
        if self.history_capacity == 0 {
            return Err(Error::Config("history capacity must be at least 1".to_string()));
        }
        if self.default_language.trim().is_empty() {
            return Err(Error::Config("default language is empty".to_string()));
        }
        if self.trivia.is_empty() {
            return Err(Error::Config("trivia bank is empty".to_string()));
        }
        if let Some(q) = self
            .trivia
            .iter()
            .find(|q| q.prompt.trim().is_empty() || q.answer.trim().is_empty())
        {
            return Err(Error::Config(format!(
                "trivia question has an empty prompt or answer: {q:?}"
            )));
        }
        self.probabilities.validate()
    }
}

/// Probabilities of optional conversational moves, each 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    /// Append "how are you" to a greeting
    pub greeting_how_are_you: f64,
    /// Ask the user's name when asked ours
    pub name_ask: f64,
    /// Offer another joke
    pub joke_ask_more: f64,
    /// Use the user's name when not understanding
    pub unknown_personalized: f64,
    /// Signal a follow-up after small talk
    pub small_talk_follow_up: f64,
    /// Follow-up: ask the user's name
    pub follow_up_name: f64,
    /// Follow-up: ask how the user is
    pub follow_up_how_are_you: f64,
    /// Follow-up: pose a trivia question
    pub follow_up_trivia: f64,
}

impl Default for Probabilities {
    fn default() -> Self {
        Self {
            greeting_how_are_you: 0.3,
            name_ask: 0.5,
            joke_ask_more: 0.3,
            unknown_personalized: 0.5,
            small_talk_follow_up: 0.4,
            follow_up_name: 0.2,
            follow_up_how_are_you: 0.3,
            follow_up_trivia: 0.2,
        }
    }
}

impl Probabilities {
    /// Every probability set to `p`
    #[must_use]
    pub const fn uniform(p: f64) -> Self {
        Self {
            greeting_how_are_you: p,
            name_ask: p,
            joke_ask_more: p,
            unknown_personalized: p,
            small_talk_follow_up: p,
            follow_up_name: p,
            follow_up_how_are_you: p,
            follow_up_trivia: p,
        }
    }

    fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("greeting_how_are_you", self.greeting_how_are_you),
            ("name_ask", self.name_ask),
            ("joke_ask_more", self.joke_ask_more),
            ("unknown_personalized", self.unknown_personalized),
            ("small_talk_follow_up", self.small_talk_follow_up),
            ("follow_up_name", self.follow_up_name),
            ("follow_up_how_are_you", self.follow_up_how_are_you),
            ("follow_up_trivia", self.follow_up_trivia),
        ]
    }

    /// # Errors
    ///
    /// Returns `Error::Config` if any probability is outside 0..=1
    pub fn validate(&self) -> Result<()> {
        match self
            .named()
            .into_iter()
            .find(|(_, p)| !(0.0..=1.0).contains(p))
        {
            Some((name, p)) => Err(Error::Config(format!(
                "probability {name} must be within 0..=1, got {p}"
            ))),
            None => Ok(()),
        }
    }
}

/// Wake word settings
#[derive(Debug, Clone)]
pub struct WakeWordConfig {
    /// Phrases that activate the assistant
    pub words: Vec<String>,

    /// Ignore input until a wake word is heard
    pub required: bool,

    /// Seconds an activation waits for its command before going idle
    pub timeout_secs: u64,
}

impl Default for WakeWordConfig {
    fn default() -> Self {
        Self {
            words: ["hey shadow", "shadow", "hey assistant", "assistant"]
                .into_iter()
                .map(String::from)
                .collect(),
            required: false,
            timeout_secs: DEFAULT_WAKE_TIMEOUT_SECS,
        }
    }
}

impl WakeWordConfig {
    /// Build a detector over the configured words and timeout
    #[must_use]
    pub fn detector(&self) -> WakeWordDetector {
        WakeWordDetector::new(self.words.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Load configuration from the environment and a TOML file
    ///
    /// An explicit `path` must exist and parse. Without one, the standard
    /// `~/.config/shadow/config.toml` is used if present.
    ///
    /// # Errors
    ///
    /// Returns error if the explicit file cannot be loaded or a value is out
    /// of range
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = match path {
            Some(path) => file::read_config_file(path)?,
            None => file::load_config_file(),
        };
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Layer `env` over the file values over defaults, then validate
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a resolved value is out of range
    pub fn resolve<F>(fc: file::ShadowConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DialogueConfig::default();
        let p = Probabilities::default();
        let fp = fc.probabilities;

        let probabilities = Probabilities {
            greeting_how_are_you: fp.greeting_how_are_you.unwrap_or(p.greeting_how_are_you),
            name_ask: fp.name_ask.unwrap_or(p.name_ask),
            joke_ask_more: fp.joke_ask_more.unwrap_or(p.joke_ask_more),
            unknown_personalized: fp.unknown_personalized.unwrap_or(p.unknown_personalized),
            small_talk_follow_up: fp.small_talk_follow_up.unwrap_or(p.small_talk_follow_up),
            follow_up_name: fp.follow_up_name.unwrap_or(p.follow_up_name),
            follow_up_how_are_you: fp.follow_up_how_are_you.unwrap_or(p.follow_up_how_are_you),
            follow_up_trivia: fp.follow_up_trivia.unwrap_or(p.follow_up_trivia),
        };

        let dialogue = DialogueConfig {
            similarity_threshold: parse_env(&env, "SHADOW_SIMILARITY_THRESHOLD")
                .or(fc.dialogue.similarity_threshold)
                .unwrap_or(defaults.similarity_threshold),
            history_capacity: parse_env(&env, "SHADOW_HISTORY_SIZE")
                .or(fc.dialogue.history_size)
                .unwrap_or(defaults.history_capacity),
            default_language: env("SHADOW_LANGUAGE")
                .or(fc.language)
                .map_or(defaults.default_language, |l| l.trim().to_lowercase()),
            idle_threshold_secs: fc
                .dialogue
                .idle_threshold_secs
                .unwrap_or(defaults.idle_threshold_secs),
            probabilities,
            trivia: fc.trivia.unwrap_or(defaults.trivia),
            seed: parse_env(&env, "SHADOW_SEED").or(fc.seed),
        };
        dialogue.validate()?;

        let wake_defaults = WakeWordConfig::default();
        let wake_word = WakeWordConfig {
            words: fc.wake_word.words.unwrap_or(wake_defaults.words),
            required: fc.wake_word.required.unwrap_or(wake_defaults.required),
            timeout_secs: fc.wake_word.timeout_secs.unwrap_or(wake_defaults.timeout_secs),
        };

        let catalog_dir = env("SHADOW_CATALOG_DIR")
            .or(fc.catalog_dir)
            .map(PathBuf::from);

        Ok(Self {
            dialogue,
            wake_word,
            catalog_dir,
        })
    }
}

/// Parse an environment value, warning when it is malformed
fn parse_env<T, F>(env: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid environment value");
            None
        }
    }
}
