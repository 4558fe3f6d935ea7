//! User-defined replacement shortcuts (presets).
//!
//! A preset maps a spoken trigger to literal final text, e.g. saying "打卡"
//! commits "已签到！". When a trigger matches, the replacement overrides all
//! further processing in the pipeline, so the table is the user's way of
//! binding an utterance to an exact, intentional answer.
//!
//! The pipeline evaluates the table fresh on every call and never caches it,
//! so edits made in the settings store take effect on the next utterance.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by a preset lookup. The pipeline treats this as a
/// degrading error: it logs and continues as if nothing matched.
#[derive(Debug, Error)]
pub enum PresetLookupError {
    #[error("invalid preset pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Lookup capability the pipeline consumes. Implemented by [`PresetTable`]
/// and by whatever store an embedding application brings.
pub trait PresetLookup {
    fn find_replacement(&self, text: &str) -> Result<Option<String>, PresetLookupError>;
}

/// One shortcut rule: an exact trigger, or a regex the whole input must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetRule {
    pub trigger: String,
    pub replacement: String,
    #[serde(default)]
    pub is_pattern: bool,
}

/// The user's shortcut table, checked in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetTable {
    #[serde(default)]
    rules: Vec<PresetRule>,
}

impl PresetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_exact(&mut self, trigger: impl Into<String>, replacement: impl Into<String>) {
        self.rules.push(PresetRule {
            trigger: trigger.into(),
            replacement: replacement.into(),
            is_pattern: false,
        });
    }

    pub fn add_pattern(&mut self, pattern: impl Into<String>, replacement: impl Into<String>) {
        self.rules.push(PresetRule {
            trigger: pattern.into(),
            replacement: replacement.into(),
            is_pattern: true,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl PresetLookup for PresetTable {
    fn find_replacement(&self, text: &str) -> Result<Option<String>, PresetLookupError> {
        let needle = text.trim();
        for rule in &self.rules {
            // Empty replacements mean "no match" rather than "replace with
            // nothing"; the pipeline must always have text to commit.
            if rule.replacement.is_empty() {
                continue;
            }
            let hit = if rule.is_pattern {
                let anchored = format!("^(?:{})$", rule.trigger);
                let re = Regex::new(&anchored).map_err(|source| PresetLookupError::BadPattern {
                    pattern: rule.trigger.clone(),
                    source,
                })?;
                re.is_match(needle)
            } else {
                rule.trigger == needle
            };
            if hit {
                return Ok(Some(rule.replacement.clone()));
            }
        }
        Ok(None)
    }
}
