//! TOML configuration file loading
//!
//! Supports `~/.config/shadow/config.toml` as a persistent config source.
//! All fields are optional, the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;
use crate::trivia::TriviaQuestion;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ShadowConfigFile {
    /// Default/fallback language code (e.g. "en")
    #[serde(default)]
    pub language: Option<String>,

    /// Seed for reproducible response choices
    #[serde(default)]
    pub seed: Option<u64>,

    /// Directory of `<code>.toml` language packs overriding the embedded ones
    #[serde(default)]
    pub catalog_dir: Option<String>,

    /// Matching and history tunables
    #[serde(default)]
    pub dialogue: DialogueFileConfig,

    /// Follow-up and personalization probabilities
    #[serde(default)]
    pub probabilities: ProbabilitiesFileConfig,

    /// Wake word settings
    #[serde(default)]
    pub wake_word: WakeWordFileConfig,

    /// Replacement trivia bank
    #[serde(default)]
    pub trivia: Option<Vec<TriviaQuestion>>,
}

/// Matching and history tunables
#[derive(Debug, Default, Deserialize)]
pub struct DialogueFileConfig {
    /// Minimum similarity (0..=1) for an intent match
    pub similarity_threshold: Option<f64>,

    /// Rolling history capacity
    pub history_size: Option<usize>,

    /// Session age in seconds before asking how the user is
    pub idle_threshold_secs: Option<u64>,
}

/// Probability overrides, each 0..=1
#[derive(Debug, Default, Deserialize)]
pub struct ProbabilitiesFileConfig {
    pub greeting_how_are_you: Option<f64>,
    pub name_ask: Option<f64>,
    pub joke_ask_more: Option<f64>,
    pub unknown_personalized: Option<f64>,
    pub small_talk_follow_up: Option<f64>,
    pub follow_up_name: Option<f64>,
    pub follow_up_how_are_you: Option<f64>,
    pub follow_up_trivia: Option<f64>,
}

/// Wake word configuration
#[derive(Debug, Default, Deserialize)]
pub struct WakeWordFileConfig {
    /// Phrases that activate the assistant
    pub words: Option<Vec<String>>,

    /// Ignore input until a wake word is heard
    pub required: Option<bool>,

    /// Seconds an activation waits for its command
    pub timeout_secs: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ShadowConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ShadowConfigFile {
    let Some(path) = config_file_path() else {
        return ShadowConfigFile::default();
    };

    if !path.exists() {
        return ShadowConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            ShadowConfigFile::default()
        }
    }
}

/// Read and parse a specific config file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn read_config_file(path: &Path) -> Result<ShadowConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/shadow/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("shadow").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let fc: ShadowConfigFile = toml::from_str(
            r#"
            language = "bn"

            [dialogue]
            similarity_threshold = 0.7

            [probabilities]
            name_ask = 1.0

            [[trivia]]
            prompt = "2 + 2?"
            answer = "4"
            "#,
        )
        .unwrap();

        assert_eq!(fc.language.as_deref(), Some("bn"));
        assert_eq!(fc.dialogue.similarity_threshold, Some(0.7));
        assert_eq!(fc.dialogue.history_size, None);
        assert_eq!(fc.probabilities.name_ask, Some(1.0));
        assert_eq!(fc.probabilities.joke_ask_more, None);
        assert_eq!(fc.trivia.unwrap().len(), 1);
        assert!(fc.wake_word.words.is_none());
        assert!(fc.wake_word.timeout_secs.is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        let fc: ShadowConfigFile = toml::from_str("").unwrap();
        assert!(fc.language.is_none());
        assert!(fc.seed.is_none());
        assert!(fc.trivia.is_none());
    }

    #[test]
    fn test_read_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_config_file(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_config_file_path() {
        if let Some(path) = config_file_path() {
            assert!(path.ends_with("shadow/config.toml"));
        }
    }
}
