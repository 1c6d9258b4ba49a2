//! Shared test utilities

#![allow(dead_code)]

use shadow_dialogue::{Catalog, DialogueConfig, DialogueManager, Probabilities};

/// Build a seeded manager over the embedded English catalog with every
/// optional move set to probability `p`
#[must_use]
pub fn manager(p: f64) -> DialogueManager {
    manager_with(DialogueConfig {
        probabilities: Probabilities::uniform(p),
        seed: Some(42),
        ..DialogueConfig::default()
    })
}

/// Build a manager from a custom config over the embedded English catalog
#[must_use]
pub fn manager_with(config: DialogueConfig) -> DialogueManager {
    let catalog = Catalog::embedded("en").expect("embedded catalog");
    DialogueManager::new(config, catalog).expect("failed to build dialogue manager")
}

/// Every alternative of `key` in `language`
#[must_use]
pub fn alternatives(dm: &DialogueManager, key: &str, language: &str) -> Vec<String> {
    dm.catalog().alternatives(key, language).to_vec()
}
