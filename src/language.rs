//! Language selection for an utterance

use crate::catalog::Catalog;

/// Pick the language to answer in
///
/// The language the recognizer reported wins, then the detected language,
/// then the default. A candidate is only taken if it is supported.
#[must_use]
pub fn resolve_language<'a>(
    recognized: Option<&'a str>,
    detected: Option<&'a str>,
    supported: impl Fn(&str) -> bool,
    default: &'a str,
) -> &'a str {
    [recognized, detected]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|code| !code.is_empty() && supported(code))
        .unwrap_or(default)
}

/// [`resolve_language`] against the languages of `catalog`
#[must_use]
pub fn resolve_for<'a>(
    catalog: &'a Catalog,
    recognized: Option<&'a str>,
    detected: Option<&'a str>,
) -> &'a str {
    resolve_language(
        recognized,
        detected,
        |code| catalog.supports(code),
        catalog.default_language(),
    )
}

/// Guess the language from the script of `text`
///
/// Only scripts tied to one supported language are recognized; Latin text
/// could be many languages and yields `None`.
#[must_use]
pub fn detect_script(text: &str) -> Option<&'static str> {
    let letters = text.chars().filter(|c| c.is_alphabetic() || is_bengali(*c));
    let (bengali, total) = letters.fold((0usize, 0usize), |(b, t), c| {
        (b + usize::from(is_bengali(c)), t + 1)
    });
    (total > 0 && bengali * 2 >= total).then_some("bn")
}

const fn is_bengali(c: char) -> bool {
    matches!(c, '\u{0980}'..='\u{09FF}')
}

/// Primary subtag of a locale tag, lowercased ("en-US" -> "en")
#[must_use]
pub fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported(code: &str) -> bool {
        matches!(code, "en" | "bn")
    }

    #[test]
    fn test_recognized_wins() {
        assert_eq!(resolve_language(Some("bn"), Some("en"), supported, "en"), "bn");
    }

    #[test]
    fn test_unsupported_recognized_falls_to_detected() {
        assert_eq!(resolve_language(Some("fr"), Some("bn"), supported, "en"), "bn");
    }

    #[test]
    fn test_falls_back_to_default() {
        assert_eq!(resolve_language(None, None, supported, "en"), "en");
        assert_eq!(resolve_language(Some("fr"), Some(""), supported, "en"), "en");
    }

    #[test]
    fn test_resolve_for_catalog() {
        let catalog = Catalog::embedded("en").unwrap();
        assert_eq!(resolve_for(&catalog, Some("bn"), None), "bn");
        assert_eq!(resolve_for(&catalog, Some("de"), None), "en");
    }

    #[test]
    fn test_detect_script() {
        assert_eq!(detect_script("আমার নাম রাহুল"), Some("bn"));
        assert_eq!(detect_script("what time is it"), None);
        assert_eq!(detect_script("123 ?!"), None);
    }

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("en-US"), "en");
        assert_eq!(primary_subtag("BN_bd"), "bn");
        assert_eq!(primary_subtag(""), "");
    }
}
