/*!
 * Batch translation with delimiter parsing and graceful degradation.
 *
 * The translator prefers one round-trip per batch: all texts go into a single
 * prompt, tagged with ordinal labels and separated by a literal delimiter the
 * service is instructed to echo between translations. Because the service may
 * not emit the exact requested number of segments, the parse tolerates being
 * short by one (padding with source text) and otherwise abandons the batch in
 * favor of per-item translation. A per-item call that exhausts its retries
 * yields the original text unchanged, so the output always has exactly one
 * entry per input.
 */

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::{BatchConfig, TranslationMode};
use crate::providers::{ChatClient, ChatMessage, Pacer, TokioPacer};
use crate::translation::core::{TokenUsageStats, TranslationRules};

/// Literal marker separating translated segments in a batched response
pub const SEGMENT_DELIMITER: &str = "===NEXT===";

// @const: Ordinal label prefix echoed back by some models ("Subtitle 3:")
static LABEL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Subtitle\s*\d+\s*[:：]\s*").unwrap()
});

/// Batch translator for subtitle texts
pub struct Translator {
    /// The chat boundary to call
    client: Arc<dyn ChatClient>,

    /// Mode-to-instruction lookup table
    rules: TranslationRules,

    /// Model passed through to the client
    model: String,

    /// Batch sizing, retry, and pacing knobs
    batch: BatchConfig,

    /// Delay source for retries and pacing
    pacer: Arc<dyn Pacer>,

    /// Accumulated token usage across all calls
    usage: Mutex<TokenUsageStats>,
}

impl Translator {
    /// Create a translator with real wall-clock pacing
    pub fn new(
        client: Arc<dyn ChatClient>,
        rules: TranslationRules,
        model: impl Into<String>,
        batch: BatchConfig,
    ) -> Self {
        Self::with_pacer(client, rules, model, batch, Arc::new(TokioPacer))
    }

    /// Create a translator with an injected delay source
    pub fn with_pacer(
        client: Arc<dyn ChatClient>,
        rules: TranslationRules,
        model: impl Into<String>,
        batch: BatchConfig,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        let model = model.into();
        Self {
            client,
            rules,
            usage: Mutex::new(TokenUsageStats::with_model(model.clone())),
            model,
            batch,
            pacer,
        }
    }

    /// Snapshot of accumulated token usage
    pub fn usage(&self) -> TokenUsageStats {
        self.usage.lock().unwrap().clone()
    }

    /// Pause between consecutive batch calls; exposed for the orchestrator
    pub async fn inter_batch_pause(&self) {
        self.pacer
            .pause(Duration::from_millis(self.batch.inter_batch_delay_ms))
            .await;
    }

    /// Translate one chunk of subtitle texts.
    ///
    /// Always returns exactly `texts.len()` strings in input order, whichever
    /// path produced them. Chunks below the configured minimum (or of a single
    /// text) skip the batch prompt entirely.
    pub async fn translate_chunk(&self, texts: &[String], mode: TranslationMode) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }

        if texts.len() <= 1 || texts.len() < self.batch.batch_min {
            return self.translate_one_by_one(texts, mode).await;
        }

        self.translate_batch(texts, mode).await
    }

    /// One round-trip for the whole batch, with bounded retries on call
    /// failure and full per-item fallback on an unparseable response
    async fn translate_batch(&self, texts: &[String], mode: TranslationMode) -> Vec<String> {
        let system = self.rules.system_prompt(mode);
        let user = build_batch_prompt(texts, mode);
        let attempts = self.batch.max_retries.max(1);

        let mut attempt = 0;
        loop {
            match self.call(&system, &user).await {
                Ok(raw) => {
                    let segments = parse_batch_response(&raw);
                    debug!(
                        "Batch response parsed into {} segments, expected {}",
                        segments.len(),
                        texts.len()
                    );

                    // Off by at most one: pad trailing gaps with source text,
                    // then clamp to defend against spurious extra segments.
                    if segments.len() + 1 >= texts.len() {
                        let mut result = segments;
                        while result.len() < texts.len() {
                            result.push(texts[result.len()].clone());
                        }
                        result.truncate(texts.len());
                        return result;
                    }

                    // A larger mismatch means we cannot trust the alignment of
                    // any segment; redo the entire batch item by item.
                    warn!(
                        "Batch response had {} segments for {} texts, switching to per-item translation",
                        segments.len(),
                        texts.len()
                    );
                    return self.translate_one_by_one(texts, mode).await;
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= attempts {
                        warn!(
                            "Batch call failed after {} attempts ({}), switching to per-item translation",
                            attempts, e
                        );
                        return self.translate_one_by_one(texts, mode).await;
                    }
                    warn!("Batch call failed (attempt {}/{}): {}", attempt, attempts, e);
                    self.pacer
                        .pause(Duration::from_millis(self.batch.retry_delay_ms))
                        .await;
                }
            }
        }
    }

    /// Sequential per-item translation with pacing between calls
    async fn translate_one_by_one(&self, texts: &[String], mode: TranslationMode) -> Vec<String> {
        let mut results = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            debug!("Translating entry {}/{}", i + 1, texts.len());
            results.push(self.translate_single(text, mode).await);

            if i + 1 < texts.len() {
                self.pacer
                    .pause(Duration::from_millis(self.batch.pacing_delay_ms))
                    .await;
            }
        }

        results
    }

    /// Translate a single text with bounded retries; exhausted retries return
    /// the original text so no entry is ever dropped
    async fn translate_single(&self, text: &str, mode: TranslationMode) -> String {
        let system = self.rules.system_prompt(mode);
        let attempts = self.batch.max_retries.max(1);

        let mut attempt = 0;
        loop {
            match self.call(&system, text).await {
                Ok(raw) => return raw.trim().to_string(),
                Err(e) => {
                    attempt += 1;
                    if attempt >= attempts {
                        warn!(
                            "Translation failed after {} attempts ({}), keeping original text",
                            attempts, e
                        );
                        return text.to_string();
                    }
                    warn!("Translation failed (attempt {}/{}): {}", attempt, attempts, e);
                    self.pacer
                        .pause(Duration::from_millis(self.batch.retry_delay_ms))
                        .await;
                }
            }
        }
    }

    /// One chat call, accumulating token usage
    async fn call(&self, system: &str, user: &str) -> Result<String, crate::errors::ProviderError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        let outcome = self.client.chat(&messages, &self.model).await?;
        self.usage
            .lock()
            .unwrap()
            .add_usage(outcome.input_tokens, outcome.output_tokens);
        Ok(outcome.text)
    }
}

/// Build the user message for a batch: every text tagged with a 1-based
/// ordinal label, delimiter instruction up front
pub fn build_batch_prompt(texts: &[String], mode: TranslationMode) -> String {
    let mut prompt = match mode {
        TranslationMode::Bilingual => format!(
            "Translate the following subtitle texts. Apply the translation rules to \
             every entry (English on top, Chinese below), and separate consecutive \
             results with {}:\n\n",
            SEGMENT_DELIMITER
        ),
        _ => format!(
            "Translate the following subtitle texts into {}. Separate consecutive \
             results with {}:\n\n",
            mode.display_name(),
            SEGMENT_DELIMITER
        ),
    };

    for (i, text) in texts.iter().enumerate() {
        prompt.push_str(&format!("Subtitle {}: {}\n\n", i + 1, text));
    }

    prompt
}

/// Split a raw batched response into cleaned segments.
///
/// Segments are delimiter-separated; each is trimmed, has any echoed ordinal
/// label stripped, and is discarded if empty after cleaning.
pub fn parse_batch_response(raw: &str) -> Vec<String> {
    raw.split(SEGMENT_DELIMITER)
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                return None;
            }
            let cleaned = LABEL_PREFIX.replace(trimmed, "").trim().to_string();
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect()
}
