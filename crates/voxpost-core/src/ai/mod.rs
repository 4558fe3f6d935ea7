//! AI rewrite collaborator boundary.
//!
//! The pipeline talks to the rewrite service through the [`AiProcessor`]
//! trait. A call either returns a structured [`AiOutcome`] (success or a
//! failure the endpoint reported, e.g. an HTTP error status) or raises an
//! [`AiCallError`] for hard failures the call itself hit. Cancellation is a
//! dedicated variant so callers can tell an aborted call from a broken one.

mod openai_compatible;

pub use openai_compatible::{DEFAULT_AI_ENDPOINT, OpenAiCompatibleProcessor};

use async_trait::async_trait;
use thiserror::Error;

use crate::settings::PostProcessSettings;

pub const DEFAULT_REWRITE_PROMPT: &str = "You clean up voice dictation. \
Fix grammar and punctuation, remove filler words, and keep the original \
meaning and language. Reply with the corrected text only.";

/// Structured result of one rewrite call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiOutcome {
    pub ok: bool,
    pub text: String,
    pub http_status: Option<u16>,
    pub error_message: Option<String>,
}

impl AiOutcome {
    pub fn success(text: String, http_status: Option<u16>) -> Self {
        Self {
            ok: true,
            text,
            http_status,
            error_message: None,
        }
    }

    pub fn failure(http_status: Option<u16>, error_message: String) -> Self {
        Self {
            ok: false,
            text: String::new(),
            http_status,
            error_message: Some(error_message),
        }
    }
}

/// Hard failures raised by a rewrite call.
#[derive(Debug, Error)]
pub enum AiCallError {
    #[error("AI request failed: {0}")]
    Transport(String),

    #[error("AI endpoint returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("AI response was malformed: {0}")]
    Malformed(String),

    #[error("AI call cancelled")]
    Cancelled,
}

/// A remote rewrite service. Implementations must be safe to call from
/// concurrent pipeline invocations; the pipeline itself holds no state.
#[async_trait]
pub trait AiProcessor: Send + Sync {
    async fn process(
        &self,
        text: &str,
        settings: &PostProcessSettings,
        prompt_override: Option<&str>,
    ) -> Result<AiOutcome, AiCallError>;
}
