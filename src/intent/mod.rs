//! Intent classification
//!
//! Maps a free-text utterance to the closest intent by fuzzy similarity
//! against per-language phrase templates.

pub mod fuzzy;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// A category of user request the assistant recognizes
///
/// Declaration order is significant: it breaks ties between equally
/// scored intents (first wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Time,
    Name,
    Joke,
    Exit,
    HowAreYou,
    Thanks,
    Weather,
    Capabilities,
    AboutYou,
    UserName,
    HowMade,
    Yes,
    No,
    Why,
    WhatElse,
    AskQuestion,
    AnswerQuestion,
}

impl Intent {
    /// Every intent in declaration order
    pub const ALL: [Self; 18] = [
        Self::Greeting,
        Self::Time,
        Self::Name,
        Self::Joke,
        Self::Exit,
        Self::HowAreYou,
        Self::Thanks,
        Self::Weather,
        Self::Capabilities,
        Self::AboutYou,
        Self::UserName,
        Self::HowMade,
        Self::Yes,
        Self::No,
        Self::Why,
        Self::WhatElse,
        Self::AskQuestion,
        Self::AnswerQuestion,
    ];

    /// Parse from a snake-case label like `how_are_you`
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == s)
    }

    /// Snake-case label, also the phrase table key
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Time => "time",
            Self::Name => "name",
            Self::Joke => "joke",
            Self::Exit => "exit",
            Self::HowAreYou => "how_are_you",
            Self::Thanks => "thanks",
            Self::Weather => "weather",
            Self::Capabilities => "capabilities",
            Self::AboutYou => "about_you",
            Self::UserName => "user_name",
            Self::HowMade => "how_made",
            Self::Yes => "yes",
            Self::No => "no",
            Self::Why => "why",
            Self::WhatElse => "what_else",
            Self::AskQuestion => "ask_question",
            Self::AnswerQuestion => "answer_question",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one utterance
///
/// `intent` is `None` (confidence 0) when nothing cleared the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Winning intent
    pub intent: Option<Intent>,
    /// Similarity of the winning phrase, 0..=100
    pub confidence: u8,
}

impl MatchResult {
    /// The "nothing matched" result
    pub const NONE: Self = Self {
        intent: None,
        confidence: 0,
    };
}

/// Fuzzy intent matcher over normalized phrase templates
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    /// language -> (intent, normalized phrases) in declaration order
    phrases: HashMap<String, Vec<(Intent, Vec<String>)>>,
    default_language: String,
    /// Minimum winning score on the 0..=100 scale
    threshold: f64,
}

impl IntentMatcher {
    /// Build a matcher from the phrase tables of every loaded language pack
    ///
    /// `similarity_threshold` is on the 0..=1 scale.
    #[must_use]
    pub fn new(catalog: &Catalog, similarity_threshold: f64) -> Self {
        let phrases = catalog
            .languages()
            .map(|code| {
                let table = Intent::ALL
                    .iter()
                    .filter_map(|intent| {
                        let templates = catalog.phrases(code, *intent)?;
                        let normalized = templates.iter().map(|p| fuzzy::normalize(p)).collect();
                        Some((*intent, normalized))
                    })
                    .collect();
                (code.to_string(), table)
            })
            .collect();

        Self {
            phrases,
            default_language: catalog.default_language().to_string(),
            threshold: similarity_threshold * 100.0,
        }
    }

    /// Classify an utterance
    ///
    /// Unknown languages are matched against the default language's
    /// phrases. Pure: depends only on the input and the phrase tables.
    #[must_use]
    pub fn match_utterance(&self, utterance: &str, language: &str) -> MatchResult {
        let Some(table) = self
            .phrases
            .get(language)
            .or_else(|| self.phrases.get(&self.default_language))
        else {
            return MatchResult::NONE;
        };

        let text = fuzzy::normalize(utterance);
        if text.is_empty() {
            return MatchResult::NONE;
        }

        let mut best: Option<Intent> = None;
        let mut best_score = 0u8;

        for (intent, templates) in table {
            for template in templates {
                let score = fuzzy::weighted_ratio_normalized(&text, template);
                // Strict comparison keeps the earliest intent on ties
                if score > best_score {
                    best = Some(*intent);
                    best_score = score;
                }
            }
        }

        if best.is_some() && f64::from(best_score) >= self.threshold {
            tracing::debug!(
                intent = ?best,
                confidence = best_score,
                language,
                "utterance matched"
            );
            MatchResult {
                intent: best,
                confidence: best_score,
            }
        } else {
            tracing::debug!(best_score, language, "no intent above threshold");
            MatchResult::NONE
        }
    }

    /// Threshold on the 0..=100 scale
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }
}
