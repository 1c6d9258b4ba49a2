//! Response catalog
//!
//! Language packs hold the matching phrases, spoken response templates and
//! name-extraction patterns for one language. English and Bengali packs are
//! embedded; a directory of `<code>.toml` files can replace or extend them.

mod pack;
mod template;

use std::collections::HashMap;
use std::path::Path;

use rand::Rng;

pub use pack::{LanguagePack, ResponseEntry};
pub use template::fill;

use crate::intent::Intent;
use crate::{Error, Result};

/// Packs compiled into the binary
const EMBEDDED_PACKS: &[(&str, &str)] = &[
    ("en", include_str!("../../lang/en.toml")),
    ("bn", include_str!("../../lang/bn.toml")),
];

/// Last-resort text when even `generic_error` is missing
pub const GENERIC_ERROR: &str = "Sorry, an internal error occurred.";

/// Response keys the default-language pack must define
pub const REQUIRED_KEYS: &[&str] = &[
    "greeting",
    "greeting_personalized",
    "greeting_repeat",
    "greeting_followup",
    "how_are_you",
    "how_are_you_resp_glad",
    "how_are_you_resp_sorry",
    "time",
    "time_repeat",
    "name",
    "name_repeat",
    "name_ask",
    "user_name_confirm",
    "user_name_fail",
    "joke",
    "joke_ask_more",
    "joke_out",
    "thanks",
    "capabilities",
    "about_you",
    "how_made",
    "weather",
    "exit",
    "yes_generic",
    "no_generic",
    "why",
    "what_else",
    "unknown",
    "unknown_personalized",
    "followup_name",
    "followup_how_are_you",
    "no_command",
    "wake_word_listening",
    "wake_word_enabled_msg",
    "activated_msg",
    "initial_greeting",
    "shutdown_msg",
    "goodbye_msg",
    "goodbye_personalized",
    "fallback_error",
    "generic_error",
    "ask_question",
    "question_correct",
    "question_incorrect",
    "question_timeout",
];

/// Read-only, language-indexed response and phrase tables
#[derive(Debug, Clone)]
pub struct Catalog {
    packs: HashMap<String, LanguagePack>,
    default_language: String,
}

impl Catalog {
    /// Load the embedded packs
    ///
    /// # Errors
    ///
    /// Returns error if an embedded pack fails to parse or the default
    /// language is missing or incomplete
    pub fn embedded(default_language: &str) -> Result<Self> {
        Self::load(default_language, None)
    }

    /// Load the embedded packs, then overlay every `*.toml` in `dir`
    ///
    /// A file whose `code` matches an embedded pack replaces it.
    ///
    /// # Errors
    ///
    /// Returns error if any pack fails to parse, the directory cannot be
    /// read, or the default language is missing or incomplete
    pub fn load(default_language: &str, dir: Option<&Path>) -> Result<Self> {
        let mut packs = Vec::with_capacity(EMBEDDED_PACKS.len());
        for (code, content) in EMBEDDED_PACKS {
            let pack = LanguagePack::parse(content)
                .map_err(|e| Error::Catalog(format!("embedded pack '{code}': {e}")))?;
            packs.push(pack);
        }

        if let Some(dir) = dir {
            for pack in load_dir(dir)? {
                packs.retain(|p| p.code != pack.code);
                packs.push(pack);
            }
        }

        Self::from_packs(packs, default_language)
    }

    /// Build a catalog from already parsed packs
    ///
    /// # Errors
    ///
    /// Returns error if the default language has no pack, or its pack lacks
    /// phrases for an intent or a required response key
    pub fn from_packs(packs: Vec<LanguagePack>, default_language: &str) -> Result<Self> {
        let default_language = default_language.trim().to_lowercase();
        let packs: HashMap<String, LanguagePack> =
            packs.into_iter().map(|p| (p.code.clone(), p)).collect();

        let Some(default_pack) = packs.get(&default_language) else {
            return Err(Error::Catalog(format!(
                "no language pack for default language '{default_language}'"
            )));
        };

        let missing_intents = default_pack.missing_intents();
        if !missing_intents.is_empty() {
            let names: Vec<&str> = missing_intents.iter().map(Intent::as_str).collect();
            return Err(Error::Catalog(format!(
                "default language '{default_language}' has no phrases for: {}",
                names.join(", ")
            )));
        }

        let missing_keys = default_pack.missing_keys(REQUIRED_KEYS);
        if !missing_keys.is_empty() {
            return Err(Error::Catalog(format!(
                "default language '{default_language}' is missing responses: {}",
                missing_keys.join(", ")
            )));
        }

        for pack in packs.values().filter(|p| p.code != default_language) {
            let missing_intents = pack.missing_intents();
            if !missing_intents.is_empty() {
                tracing::warn!(
                    language = %pack.code,
                    missing = missing_intents.len(),
                    "language pack lacks phrases for some intents"
                );
            }
            let missing_keys = pack.missing_keys(REQUIRED_KEYS);
            if !missing_keys.is_empty() {
                tracing::warn!(
                    language = %pack.code,
                    keys = %missing_keys.join(", "),
                    "language pack lacks responses, falling back to default language"
                );
            }
        }

        tracing::info!(
            languages = packs.len(),
            default = %default_language,
            "response catalog loaded"
        );

        Ok(Self {
            packs,
            default_language,
        })
    }

    /// The fallback language code
    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Codes of every loaded language
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }

    /// Whether a pack exists for `language`
    #[must_use]
    pub fn supports(&self, language: &str) -> bool {
        self.packs.contains_key(language)
    }

    /// Matching phrases of `intent` in exactly `language`
    #[must_use]
    pub fn phrases(&self, language: &str, intent: Intent) -> Option<&Vec<String>> {
        self.packs.get(language)?.phrases.get(&intent)
    }

    /// Name-extraction patterns of exactly `language`
    #[must_use]
    pub fn name_patterns(&self, language: &str) -> Option<&[String]> {
        self.packs.get(language).map(|p| p.name_patterns.as_slice())
    }

    /// Resolve `key` under `language`, then the default language
    #[must_use]
    pub fn entry(&self, key: &str, language: &str) -> Option<&ResponseEntry> {
        if let Some(entry) = self.packs.get(language).and_then(|p| p.responses.get(key)) {
            return Some(entry);
        }
        if language != self.default_language {
            tracing::debug!(key, language, "response missing, using default language");
        }
        self.packs
            .get(&self.default_language)
            .and_then(|p| p.responses.get(key))
    }

    /// All templates of `key` (empty if the key is unknown everywhere)
    #[must_use]
    pub fn alternatives(&self, key: &str, language: &str) -> &[String] {
        self.entry(key, language)
            .map(ResponseEntry::alternatives)
            .unwrap_or_default()
    }

    /// Render a response
    ///
    /// Picks uniformly among alternatives using `rng` and fills named
    /// placeholders from `params`. Never fails: a missing key renders the
    /// catalog's `generic_error`, a missing parameter returns the template
    /// unformatted. Both are logged.
    pub fn render<R: Rng + ?Sized>(
        &self,
        key: &str,
        language: &str,
        params: &[(&str, &str)],
        rng: &mut R,
    ) -> String {
        let Some(entry) = self.entry(key, language) else {
            tracing::warn!(key, language, "response key not found in any language");
            return self.generic_error(language);
        };

        let template = entry.choose(rng);
        match fill(template, params) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(key, language, error = %e, "could not fill response template");
                template.to_string()
            }
        }
    }

    /// The catalog's generic error text
    #[must_use]
    pub fn generic_error(&self, language: &str) -> String {
        self.entry("generic_error", language)
            .and_then(|e| e.alternatives().first())
            .map_or_else(|| GENERIC_ERROR.to_string(), Clone::clone)
    }
}

/// Parse every `*.toml` file in `dir`
fn load_dir(dir: &Path) -> Result<Vec<LanguagePack>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut packs = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(&path)?;
        let pack = LanguagePack::parse(&content)
            .map_err(|e| Error::Catalog(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), language = %pack.code, "loaded language pack");
        packs.push(pack);
    }
    Ok(packs)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::embedded("en").unwrap();
        assert_eq!(catalog.default_language(), "en");
        assert!(catalog.supports("en"));
        assert!(catalog.supports("bn"));
        assert!(!catalog.supports("fr"));
        for intent in Intent::ALL {
            assert!(catalog.phrases("en", intent).is_some(), "missing {intent}");
        }
    }

    #[test]
    fn test_embedded_bengali_as_default() {
        let catalog = Catalog::embedded("bn").unwrap();
        assert_eq!(catalog.default_language(), "bn");
        for intent in Intent::ALL {
            assert!(catalog.phrases("bn", intent).is_some(), "missing {intent}");
        }
        // English keeps working as a secondary language
        assert!(catalog.supports("en"));
    }

    #[test]
    fn test_incomplete_default_pack_is_rejected() {
        let partial = LanguagePack::parse("code = \"xx\"\n[phrases]\ngreeting = [\"salut\"]\n").unwrap();
        let err = Catalog::from_packs(vec![partial], "xx").unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
    }

    #[test]
    fn test_unknown_default_language_is_rejected() {
        assert!(matches!(Catalog::embedded("fr"), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_render_fills_placeholders() {
        let catalog = Catalog::embedded("en").unwrap();
        let text = catalog.render("user_name_confirm", "en", &[("name", "Alex")], &mut rng());
        assert_eq!(text, "It's great to meet you, Alex! How can I help you today?");
    }

    #[test]
    fn test_render_picks_from_alternatives() {
        let catalog = Catalog::embedded("en").unwrap();
        let jokes = catalog.alternatives("joke", "en");
        assert_eq!(jokes.len(), 10);

        let mut rng = rng();
        for _ in 0..10 {
            let joke = catalog.render("joke", "en", &[], &mut rng);
            assert!(jokes.contains(&joke));
        }
    }

    #[test]
    fn test_render_falls_back_to_default_language() {
        let en = LanguagePack::parse(EMBEDDED_PACKS[0].1).unwrap();
        let partial = LanguagePack::parse(
            "code = \"bn\"\n[responses]\nname = \"আমি শ্যাডো।\"\n",
        )
        .unwrap();
        let catalog = Catalog::from_packs(vec![en, partial], "en").unwrap();

        let goodbye = catalog.render("goodbye_msg", "en", &[], &mut rng());
        assert_eq!(catalog.render("goodbye_msg", "bn", &[], &mut rng()), goodbye);
        assert_eq!(catalog.render("goodbye_msg", "fr", &[], &mut rng()), goodbye);
        assert_eq!(catalog.render("name", "bn", &[], &mut rng()), "আমি শ্যাডো।");
    }

    #[test]
    fn test_render_uses_requested_language() {
        let catalog = Catalog::embedded("en").unwrap();
        let bn = catalog.render("user_name_fail", "bn", &[], &mut rng());
        let en = catalog.render("user_name_fail", "en", &[], &mut rng());
        assert_ne!(bn, en);
    }

    #[test]
    fn test_render_missing_key_returns_generic_error() {
        let catalog = Catalog::embedded("en").unwrap();
        let text = catalog.render("no_such_key", "en", &[], &mut rng());
        assert_eq!(text, catalog.generic_error("en"));
        assert_ne!(text, GENERIC_ERROR);
    }

    #[test]
    fn test_render_missing_param_returns_template() {
        let catalog = Catalog::embedded("en").unwrap();
        let text = catalog.render("goodbye_personalized", "en", &[], &mut rng());
        assert_eq!(text, "Goodbye, {name}! Have a wonderful day!");
    }

    #[test]
    fn test_catalog_dir_overrides_pack() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = EMBEDDED_PACKS[0].1.to_string();
        content = content.replace(
            "name = \"I'm Shadow, your AI assistant. I'm here to help and chat with you.\"",
            "name = \"I'm Umbra.\"",
        );
        std::fs::write(dir.path().join("en.toml"), content).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = Catalog::load("en", Some(dir.path())).unwrap();
        assert_eq!(catalog.render("name", "en", &[], &mut rng()), "I'm Umbra.");
        assert!(catalog.supports("bn"));
    }

    #[test]
    fn test_catalog_dir_with_broken_pack_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("xx.toml"), "code = ").unwrap();
        assert!(Catalog::load("en", Some(dir.path())).is_err());
    }
}
