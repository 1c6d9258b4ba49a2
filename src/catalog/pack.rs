//! Language pack file schema and parsing

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::intent::Intent;
use crate::{Error, Result};

/// A catalog entry: one fixed template or interchangeable alternatives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResponseEntry {
    /// Single template string
    Single(String),
    /// Alternatives chosen uniformly at random
    Choices(Vec<String>),
}

impl ResponseEntry {
    /// All templates of this entry
    #[must_use]
    pub fn alternatives(&self) -> &[String] {
        match self {
            Self::Single(s) => std::slice::from_ref(s),
            Self::Choices(v) => v,
        }
    }

    /// Pick a template, uniformly among alternatives
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        match self {
            Self::Single(s) => s,
            Self::Choices(v) => v.choose(rng).map_or("", String::as_str),
        }
    }
}

/// On-disk layout of a language pack
#[derive(Debug, Deserialize)]
struct PackFile {
    code: String,
    #[serde(default)]
    name_patterns: Vec<String>,
    #[serde(default)]
    phrases: HashMap<String, Vec<String>>,
    #[serde(default)]
    responses: HashMap<String, ResponseEntry>,
}

/// Phrases, responses and name patterns for one language
#[derive(Debug, Clone)]
pub struct LanguagePack {
    /// Short language code (e.g. "en")
    pub code: String,
    /// Matching phrases per intent
    pub phrases: HashMap<Intent, Vec<String>>,
    /// Response templates by key
    pub responses: HashMap<String, ResponseEntry>,
    /// Regexes whose first capture group is the user's name
    pub name_patterns: Vec<String>,
}

impl LanguagePack {
    /// Parse a pack from TOML
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed, names an unknown intent, or
    /// contains an empty phrase list or empty alternative set
    pub fn parse(content: &str) -> Result<Self> {
        let file: PackFile = toml::from_str(content)?;
        let code = file.code.trim().to_lowercase();
        if code.is_empty() {
            return Err(Error::Catalog("language pack has an empty code".to_string()));
        }

        let mut phrases = HashMap::with_capacity(file.phrases.len());
        for (name, list) in file.phrases {
            let intent = Intent::from_name(&name).ok_or_else(|| {
                Error::Catalog(format!("{code}: unknown intent '{name}' in phrases"))
            })?;
            if list.iter().all(|p| p.trim().is_empty()) {
                return Err(Error::Catalog(format!(
                    "{code}: intent '{name}' has no phrases"
                )));
            }
            phrases.insert(intent, list);
        }

        for (key, entry) in &file.responses {
            if entry.alternatives().is_empty() {
                return Err(Error::Catalog(format!(
                    "{code}: response '{key}' has no alternatives"
                )));
            }
        }

        Ok(Self {
            code,
            phrases,
            responses: file.responses,
            name_patterns: file.name_patterns,
        })
    }

    /// Intents this pack has no phrases for, in declaration order
    #[must_use]
    pub fn missing_intents(&self) -> Vec<Intent> {
        Intent::ALL
            .into_iter()
            .filter(|i| !self.phrases.contains_key(i))
            .collect()
    }

    /// Keys from `required` this pack lacks
    #[must_use]
    pub fn missing_keys<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|k| !self.responses.contains_key(*k))
            .collect()
    }
}
