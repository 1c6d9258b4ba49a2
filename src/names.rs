//! User-name extraction
//!
//! Each language pack lists regexes whose first capture group is the name,
//! e.g. "my name is (X)". Patterns are matched case-insensitively.

use std::collections::HashMap;

use regex::Regex;

use crate::catalog::Catalog;

/// Compiled per-language name patterns
#[derive(Debug, Clone)]
pub struct NameExtractor {
    patterns: HashMap<String, Vec<Regex>>,
    default_language: String,
}

impl NameExtractor {
    /// Compile the name patterns of every language in `catalog`
    ///
    /// Invalid patterns are logged and skipped.
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        let patterns = catalog
            .languages()
            .map(|code| {
                let compiled = catalog
                    .name_patterns(code)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|p| match Regex::new(&format!("(?i){p}")) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            tracing::warn!(language = code, pattern = %p, error = %e, "invalid name pattern");
                            None
                        }
                    })
                    .collect();
                (code.to_string(), compiled)
            })
            .collect();

        Self {
            patterns,
            default_language: catalog.default_language().to_string(),
        }
    }

    /// Extract the user's name from `utterance`
    ///
    /// Tries `language` first, then the default language. The first letter
    /// is uppercased and the rest lowercased.
    #[must_use]
    pub fn extract(&self, utterance: &str, language: &str) -> Option<String> {
        let languages = [language, self.default_language.as_str()];
        let name = languages
            .iter()
            .enumerate()
            .filter(|(i, code)| *i == 0 || **code != language)
            .filter_map(|(_, code)| self.patterns.get(*code))
            .flat_map(|patterns| patterns.iter())
            .find_map(|re| re.captures(utterance)?.get(1))
            .map(|m| capitalize(m.as_str().trim()))
            .filter(|n| !n.is_empty());

        match &name {
            Some(n) => tracing::debug!(name = %n, language, "extracted user name"),
            None => tracing::debug!(language, "no user name in utterance"),
        }
        name
    }
}

/// Uppercase the first character, lowercase the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> NameExtractor {
        NameExtractor::new(&Catalog::embedded("en").unwrap())
    }

    #[test]
    fn test_extract_english_forms() {
        let names = extractor();
        assert_eq!(names.extract("my name is Alex", "en").as_deref(), Some("Alex"));
        assert_eq!(names.extract("Call me JORDAN please", "en").as_deref(), Some("Jordan"));
        assert_eq!(names.extract("i'm sam", "en").as_deref(), Some("Sam"));
        assert_eq!(names.extract("Riley is my name", "en").as_deref(), Some("Riley"));
    }

    #[test]
    fn test_extract_fails_without_name() {
        let names = extractor();
        assert_eq!(names.extract("what time is it", "en"), None);
        assert_eq!(names.extract("", "en"), None);
    }

    #[test]
    fn test_extract_bengali() {
        let names = extractor();
        assert_eq!(names.extract("আমার নাম রাহুল", "bn").as_deref(), Some("রাহুল"));
        assert_eq!(names.extract("আমার নাম হলো রাহুল।", "bn").as_deref(), Some("রাহুল"));
    }

    #[test]
    fn test_extract_falls_back_to_default_language() {
        let names = extractor();
        assert_eq!(names.extract("my name is Alex", "bn").as_deref(), Some("Alex"));
        assert_eq!(names.extract("my name is Alex", "fr").as_deref(), Some("Alex"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("aLEX"), "Alex");
        assert_eq!(capitalize(""), "");
    }
}
