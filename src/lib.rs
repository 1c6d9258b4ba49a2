//! Shadow Dialogue - conversational core of the Shadow voice assistant
//!
//! This library turns a recognized utterance into a spoken response:
//! - Fuzzy intent matching against per-language phrase lists
//! - A multilingual response catalog with templated alternatives
//! - Conversation state for pending questions and the user's name
//! - Contextual responses and proactive follow-up questions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │          Caller (speech loop, REPL, tests)           │
//! │   Wake word  │  Language  │  STT / TTS (external)    │
//! └────────────────────┬────────────────────────────────┘
//!                      │ utterance + language
//! ┌────────────────────▼────────────────────────────────┐
//! │                 DialogueManager                      │
//! │   IntentMatcher  │  State  │  History  │  Follow-up │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Catalog (language packs)                │
//! │   Phrases  │  Responses  │  Name patterns           │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod fallback;
pub mod history;
pub mod intent;
pub mod language;
pub mod names;
pub mod state;
pub mod trivia;
pub mod wake;

pub use catalog::{Catalog, LanguagePack, ResponseEntry};
pub use config::{Config, DialogueConfig, Probabilities, WakeWordConfig};
pub use dialogue::{DialogueManager, Reply, Turn};
pub use error::{Error, Result};
pub use fallback::Fallback;
pub use history::{History, InteractionRecord};
pub use intent::{Intent, IntentMatcher, MatchResult};
pub use language::resolve_language;
pub use names::NameExtractor;
pub use state::{ConversationState, PendingQuestion};
pub use trivia::TriviaQuestion;
pub use wake::{DetectorState, WakeEvent, WakeWordDetector};
