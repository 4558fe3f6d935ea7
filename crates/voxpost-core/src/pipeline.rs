//! The final-text post-processing pipeline.
//!
//! Takes a finished recognizer transcript and produces the text actually
//! committed: trailing punctuation/emoji trimming, user preset overrides,
//! and an optional AI rewrite, in that order. Within one call the stages run
//! linearly: pre-trim, preset check (terminal on a hit), brevity gate, AI
//! call, post-trim. Every stage degrades gracefully, so the worst any
//! failure can do is leave the prior stage's text in place.
//!
//! The pipeline holds no state between calls. Settings and presets are read
//! once per invocation and never cached, so concurrent utterances are fully
//! independent.

use thiserror::Error;

use crate::ai::{AiCallError, AiProcessor};
use crate::count::effective_chars;
use crate::preset::PresetLookup;
use crate::settings::PostProcessSettings;
use crate::trim::trim_trailing;

/// Outcome of the AI-capable path.
///
/// `text` always carries the best available text, failure or not.
/// `used_ai` is true only when an AI call was attempted and succeeded; a
/// failed attempt reports false even though network I/O happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub ok: bool,
    pub text: String,
    pub error_message: Option<String>,
    pub http_status: Option<u16>,
    pub used_ai: bool,
}

impl ProcessResult {
    fn committed(text: String) -> Self {
        Self {
            ok: true,
            text,
            error_message: None,
            http_status: None,
            used_ai: false,
        }
    }
}

/// The in-flight AI call was cancelled.
///
/// This is the only way [`process_with_ai`] returns `Err`; every domain
/// failure is folded into [`ProcessResult`] instead, so a caller that sees
/// this can abandon the utterance without committing anything.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("post-processing cancelled")]
pub struct Cancelled;

/// Fast synchronous path: trim, then preset override.
///
/// A matching preset replaces the text verbatim; otherwise the (possibly
/// trimmed) transcript comes back. Never fails: a broken preset table is
/// logged and ignored.
pub fn process_simple(
    settings: &PostProcessSettings,
    presets: &dyn PresetLookup,
    input: &str,
) -> String {
    let base = if settings.trim_trailing_punctuation {
        trim_trailing(input)
    } else {
        input
    };
    match presets.find_replacement(base) {
        // An empty replacement is no match; committed text is never empty
        // because a lookup said so.
        Ok(Some(replacement)) if !replacement.is_empty() => replacement,
        Ok(_) => base.to_string(),
        Err(e) => {
            crate::verbose!("preset lookup failed, keeping transcript: {}", e);
            base.to_string()
        }
    }
}

/// Full asynchronous path with conditional AI rewrite.
///
/// The AI call runs only when the brevity gate passes, the rewrite is
/// enabled (or `force_ai`), and credentials exist. `force_ai` bypasses the
/// gate and the enabled flag but not the preset override or the credential
/// check. On AI failure the result carries the pre-AI text with `ok = false`.
pub async fn process_with_ai(
    settings: &PostProcessSettings,
    presets: &dyn PresetLookup,
    input: &str,
    processor: &dyn AiProcessor,
    prompt_override: Option<&str>,
    force_ai: bool,
) -> Result<ProcessResult, Cancelled> {
    let base = if settings.trim_trailing_punctuation {
        trim_trailing(input)
    } else {
        input
    };

    // A preset hit is the user's literal final answer: it skips the AI and
    // the post-trim on purpose, trailing punctuation and all. An empty
    // replacement counts as no match, whatever the lookup implementation.
    match presets.find_replacement(base) {
        Ok(Some(replacement)) if !replacement.is_empty() => {
            return Ok(ProcessResult::committed(replacement));
        }
        Ok(_) => {}
        Err(e) => crate::verbose!("preset lookup failed, continuing: {}", e),
    }

    let skip = if force_ai || settings.skip_ai_under_chars == 0 {
        false
    } else {
        effective_chars(base) < settings.skip_ai_under_chars as usize
    };

    let mut attempted = false;
    let mut ok = true;
    let mut text = base.to_string();
    let mut error_message = None;
    let mut http_status = None;

    if !skip && (force_ai || settings.ai_enabled) && settings.has_ai_credentials() {
        attempted = true;
        match processor.process(base, settings, prompt_override).await {
            Ok(outcome) => {
                ok = outcome.ok;
                if !outcome.text.is_empty() {
                    text = outcome.text;
                }
                error_message = outcome.error_message;
                http_status = outcome.http_status;
            }
            Err(AiCallError::Cancelled) => return Err(Cancelled),
            Err(e) => {
                crate::verbose!("AI rewrite failed, keeping transcript: {}", e);
                if let AiCallError::Http { status, .. } = &e {
                    http_status = Some(*status);
                }
                ok = false;
                error_message = Some(e.to_string());
            }
        }
    }

    // Post-trim applies to whatever the AI step produced, success or failure.
    if settings.trim_trailing_punctuation {
        text = trim_trailing(&text).to_string();
    }

    Ok(ProcessResult {
        ok,
        text,
        error_message,
        http_status,
        used_ai: attempted && ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiOutcome;
    use crate::preset::PresetTable;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// What the scripted processor should do when called.
    enum Script {
        Succeed(&'static str),
        StructuredFail(u16, &'static str),
        Fail(&'static str),
        Cancel,
    }

    struct ScriptedProcessor {
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedProcessor {
        fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AiProcessor for ScriptedProcessor {
        async fn process(
            &self,
            _text: &str,
            _settings: &PostProcessSettings,
            _prompt_override: Option<&str>,
        ) -> Result<AiOutcome, AiCallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Succeed(reply) => Ok(AiOutcome::success(reply.to_string(), Some(200))),
                Script::StructuredFail(status, message) => {
                    Ok(AiOutcome::failure(Some(*status), message.to_string()))
                }
                Script::Fail(message) => Err(AiCallError::Transport(message.to_string())),
                Script::Cancel => Err(AiCallError::Cancelled),
            }
        }
    }

    fn settings(ai_enabled: bool, skip_under: u32) -> PostProcessSettings {
        PostProcessSettings {
            trim_trailing_punctuation: true,
            ai_enabled,
            skip_ai_under_chars: skip_under,
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_simple_trims_trailing_punctuation() {
        let presets = PresetTable::new();
        assert_eq!(
            process_simple(&settings(false, 0), &presets, "hello, world!"),
            "hello, world"
        );
    }

    #[test]
    fn test_simple_respects_trim_flag() {
        let mut config = settings(false, 0);
        config.trim_trailing_punctuation = false;
        let presets = PresetTable::new();
        assert_eq!(process_simple(&config, &presets, "hello!"), "hello!");
    }

    #[test]
    fn test_simple_preset_override_is_verbatim() {
        let mut presets = PresetTable::new();
        presets.add_exact("打卡", "已签到！");
        // The override discards the trimmed text and keeps its own tail.
        assert_eq!(process_simple(&settings(false, 0), &presets, "打卡。"), "已签到！");
    }

    /// Lookup that claims a hit with empty text, as a third-party store
    /// might. The pipeline must treat it as no match.
    struct EmptyReplacementLookup;

    impl crate::preset::PresetLookup for EmptyReplacementLookup {
        fn find_replacement(
            &self,
            _text: &str,
        ) -> Result<Option<String>, crate::preset::PresetLookupError> {
            Ok(Some(String::new()))
        }
    }

    #[test]
    fn test_simple_ignores_empty_replacement_from_lookup() {
        assert_eq!(
            process_simple(&settings(false, 0), &EmptyReplacementLookup, "hello there"),
            "hello there"
        );
    }

    #[tokio::test]
    async fn test_ai_path_ignores_empty_replacement_from_lookup() {
        let processor = ScriptedProcessor::new(Script::Succeed("rewritten"));
        let result = process_with_ai(
            &settings(true, 0),
            &EmptyReplacementLookup,
            "hello there!",
            &processor,
            None,
            false,
        )
        .await
        .unwrap();
        // The lookup did not short-circuit: the AI ran and text is populated.
        assert!(result.used_ai);
        assert_eq!(result.text, "rewritten");
        assert_eq!(processor.calls(), 1);
    }

    #[test]
    fn test_simple_survives_broken_preset_table() {
        let mut presets = PresetTable::new();
        presets.add_pattern("(unclosed", "oops");
        assert_eq!(
            process_simple(&settings(false, 0), &presets, "hello!"),
            "hello"
        );
    }

    #[tokio::test]
    async fn test_ai_success_post_trimmed() {
        let processor = ScriptedProcessor::new(Script::Succeed("Cleaned text."));
        let presets = PresetTable::new();
        let result = process_with_ai(
            &settings(true, 0),
            &presets,
            "raw transcript!",
            &processor,
            None,
            false,
        )
        .await
        .unwrap();
        assert!(result.ok);
        assert!(result.used_ai);
        assert_eq!(result.text, "Cleaned text");
        assert_eq!(result.http_status, Some(200));
        assert_eq!(processor.calls(), 1);
    }

    #[tokio::test]
    async fn test_preset_short_circuit_skips_ai_and_post_trim() {
        let processor = ScriptedProcessor::new(Script::Succeed("should not run"));
        let mut presets = PresetTable::new();
        presets.add_exact("打卡", "已签到！");
        // force_ai does not get past the preset override either.
        let result = process_with_ai(&settings(true, 0), &presets, "打卡", &processor, None, true)
            .await
            .unwrap();
        assert!(result.ok);
        assert!(!result.used_ai);
        // Verbatim, including its own trailing punctuation.
        assert_eq!(result.text, "已签到！");
        assert_eq!(processor.calls(), 0);
    }

    #[tokio::test]
    async fn test_preset_matches_against_trimmed_base() {
        let processor = ScriptedProcessor::new(Script::Succeed("should not run"));
        let mut presets = PresetTable::new();
        presets.add_exact("打卡", "已签到！");
        // Pre-trim removes the period, then the preset matches.
        let result = process_with_ai(&settings(true, 0), &presets, "打卡。", &processor, None, false)
            .await
            .unwrap();
        assert_eq!(result.text, "已签到！");
        assert_eq!(processor.calls(), 0);
    }

    #[tokio::test]
    async fn test_skip_threshold_boundary() {
        // Threshold 5: a count of exactly 5 is not skipped.
        let processor = ScriptedProcessor::new(Script::Succeed("rewritten"));
        let presets = PresetTable::new();
        let result = process_with_ai(
            &settings(true, 5),
            &presets,
            "一二三四五",
            &processor,
            None,
            false,
        )
        .await
        .unwrap();
        assert!(result.used_ai);
        assert_eq!(processor.calls(), 1);

        // A count of 4 is skipped: passthrough, no call.
        let processor = ScriptedProcessor::new(Script::Succeed("rewritten"));
        let result = process_with_ai(
            &settings(true, 5),
            &presets,
            "一二三四",
            &processor,
            None,
            false,
        )
        .await
        .unwrap();
        assert!(result.ok);
        assert!(!result.used_ai);
        assert_eq!(result.text, "一二三四");
        assert_eq!(processor.calls(), 0);
    }

    #[tokio::test]
    async fn test_ai_failure_falls_back_to_base() {
        let processor = ScriptedProcessor::new(Script::Fail("connection refused"));
        let presets = PresetTable::new();
        let result = process_with_ai(
            &settings(true, 0),
            &presets,
            "keep this text!",
            &processor,
            None,
            false,
        )
        .await
        .unwrap();
        assert!(!result.ok);
        assert!(!result.used_ai);
        // Pre-AI base, post-trimmed.
        assert_eq!(result.text, "keep this text");
        assert!(result.error_message.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_structured_failure_keeps_base_and_status() {
        let processor = ScriptedProcessor::new(Script::StructuredFail(429, "rate limited"));
        let presets = PresetTable::new();
        let result = process_with_ai(
            &settings(true, 0),
            &presets,
            "keep this text!",
            &processor,
            None,
            false,
        )
        .await
        .unwrap();
        assert!(!result.ok);
        assert!(!result.used_ai);
        assert_eq!(result.http_status, Some(429));
        assert_eq!(result.text, "keep this text");
        assert_eq!(result.error_message.as_deref(), Some("rate limited"));
    }

    #[tokio::test]
    async fn test_cancellation_propagates() {
        let processor = ScriptedProcessor::new(Script::Cancel);
        let presets = PresetTable::new();
        let result = process_with_ai(
            &settings(true, 0),
            &presets,
            "whatever",
            &processor,
            None,
            false,
        )
        .await;
        assert_eq!(result, Err(Cancelled));
    }

    #[tokio::test]
    async fn test_force_ai_bypasses_gate_and_enabled_flag() {
        let processor = ScriptedProcessor::new(Script::Succeed("rewritten"));
        let presets = PresetTable::new();
        // Disabled and far under the threshold, but forced.
        let result = process_with_ai(&settings(false, 100), &presets, "hi", &processor, None, true)
            .await
            .unwrap();
        assert!(result.used_ai);
        assert_eq!(processor.calls(), 1);
    }

    #[tokio::test]
    async fn test_force_ai_still_requires_credentials() {
        // No key in settings and none in the environment.
        unsafe { std::env::remove_var("OPENAI_API_KEY") };
        let mut config = settings(true, 0);
        config.api_key = None;
        let processor = ScriptedProcessor::new(Script::Succeed("rewritten"));
        let presets = PresetTable::new();
        let result = process_with_ai(&config, &presets, "hello!", &processor, None, true)
            .await
            .unwrap();
        assert!(result.ok);
        assert!(!result.used_ai);
        assert_eq!(result.text, "hello");
        assert_eq!(processor.calls(), 0);
    }

    #[tokio::test]
    async fn test_ai_disabled_is_a_passthrough() {
        let processor = ScriptedProcessor::new(Script::Succeed("rewritten"));
        let presets = PresetTable::new();
        let result = process_with_ai(
            &settings(false, 0),
            &presets,
            "hello there!",
            &processor,
            None,
            false,
        )
        .await
        .unwrap();
        assert!(result.ok);
        assert!(!result.used_ai);
        assert_eq!(result.text, "hello there");
        assert_eq!(processor.calls(), 0);
    }
}
