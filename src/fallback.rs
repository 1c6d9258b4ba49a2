//! Generative fallback for unmatched utterances
//!
//! A deployment may hand utterances no intent matched to an external text
//! generator. The dialogue core only sees this trait; without one it answers
//! from the catalog.

use std::sync::LazyLock;

use regex::Regex;

use crate::Result;

/// Markdown emphasis and heading markers, never spoken
static MARKDOWN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*#]").expect("valid regex"));

/// Produces a reply for an utterance the matcher could not classify
pub trait Fallback {
    /// Generate a reply
    ///
    /// # Errors
    ///
    /// Returns error if the generator is unavailable or fails
    fn respond(&self, utterance: &str, language: &str) -> Result<String>;
}

impl<F> Fallback for F
where
    F: Fn(&str, &str) -> Result<String>,
{
    fn respond(&self, utterance: &str, language: &str) -> Result<String> {
        self(utterance, language)
    }
}

/// Strip markdown markers and surrounding whitespace for speech
#[must_use]
pub fn clean_response(text: &str) -> String {
    MARKDOWN.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_clean_response() {
        assert_eq!(clean_response("  **Paris** is the # capital "), "Paris is the  capital");
        assert_eq!(clean_response("plain"), "plain");
        assert_eq!(clean_response("***"), "");
    }

    #[test]
    fn test_closure_fallback() {
        let echo = |utterance: &str, language: &str| -> Result<String> {
            Ok(format!("{language}: {utterance}"))
        };
        assert_eq!(echo.respond("hi", "en").unwrap(), "en: hi");

        let failing = |_: &str, _: &str| -> Result<String> {
            Err(Error::Fallback("offline".to_string()))
        };
        assert!(failing.respond("hi", "en").is_err());
    }
}
