//! Post-processing settings: trimming, AI gating, credentials.

use serde::{Deserialize, Serialize};

/// Per-call configuration for the post-processing pipeline.
///
/// The pipeline only ever reads a snapshot of this struct; it never mutates
/// or caches it, so the owning application can hand in fresh values on every
/// utterance and mid-session edits apply immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostProcessSettings {
    /// Strip trailing punctuation and emoji before committing text
    #[serde(default = "default_trim")]
    pub trim_trailing_punctuation: bool,

    /// Whether the AI rewrite step is enabled
    #[serde(default)]
    pub ai_enabled: bool,

    /// Skip the AI call when the transcript has fewer effective characters
    /// than this. Zero disables the gate.
    #[serde(default)]
    pub skip_ai_under_chars: u32,

    /// API key for the AI endpoint (falls back to OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint (uses the default if None)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model name for the rewrite call (uses the default if None)
    #[serde(default)]
    pub model: Option<String>,

    /// Custom rewrite prompt (uses the default if None)
    #[serde(default)]
    pub prompt: Option<String>,
}

fn default_trim() -> bool {
    true
}

impl Default for PostProcessSettings {
    fn default() -> Self {
        Self {
            trim_trailing_punctuation: true,
            ai_enabled: false,
            skip_ai_under_chars: 0,
            api_key: None,
            endpoint: None,
            model: None,
            prompt: None,
        }
    }
}

impl PostProcessSettings {
    /// Get the API key, falling back to the OPENAI_API_KEY environment
    /// variable when the settings carry none.
    pub fn api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key
            && !key.is_empty()
        {
            return Some(key.clone());
        }
        std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
    }

    /// Whether an AI call could be authenticated at all.
    pub fn has_ai_credentials(&self) -> bool {
        self.api_key().is_some()
    }

    /// The rewrite prompt to use, custom or default.
    pub fn rewrite_prompt(&self) -> String {
        self.prompt
            .clone()
            .unwrap_or_else(|| crate::ai::DEFAULT_REWRITE_PROMPT.to_string())
    }
}
