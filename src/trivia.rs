//! Trivia questions the assistant can pose

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::intent::fuzzy;

/// Seconds allowed for an answer when a question does not say
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A question with its expected answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaQuestion {
    pub prompt: String,
    pub answer: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl TriviaQuestion {
    #[must_use]
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
            timeout_secs,
        }
    }

    /// Whether `reply` is the expected answer
    ///
    /// Case, surrounding punctuation and extra whitespace are ignored.
    #[must_use]
    pub fn is_correct(&self, reply: &str) -> bool {
        let expected = fuzzy::normalize(&self.answer);
        !expected.is_empty() && fuzzy::normalize(reply) == expected
    }
}

/// Pick a question uniformly from `bank`
pub fn pick<'a, R: Rng + ?Sized>(bank: &'a [TriviaQuestion], rng: &mut R) -> Option<&'a TriviaQuestion> {
    bank.choose(rng)
}

/// The built-in question bank
#[must_use]
pub fn default_bank() -> Vec<TriviaQuestion> {
    [
        ("What is the capital of France?", "paris", 10),
        ("How many sides does a hexagon have?", "6", 10),
        ("What is the largest planet in our solar system?", "jupiter", 10),
        ("What is the chemical symbol for gold?", "au", 10),
        ("Who painted the Mona Lisa?", "leonardo da vinci", 15),
        ("What is the square root of 144?", "12", 10),
        ("What is the main ingredient in guacamole?", "avocado", 10),
        ("How many continents are there?", "7", 10),
        ("What is the opposite of 'hot'?", "cold", 5),
        ("What is the largest mammal in the world?", "blue whale", 10),
    ]
    .into_iter()
    .map(|(prompt, answer, timeout)| TriviaQuestion::new(prompt, answer, timeout))
    .collect()
}
