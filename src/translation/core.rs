/*!
 * Core translation building blocks: the mode-to-instruction rules table and
 * token usage accounting.
 */

use std::collections::HashMap;
use std::time::Instant;

use crate::app_config::TranslationMode;

/// Immutable lookup table from translation mode to system instruction.
///
/// Injected into the translator at construction so tests can swap
/// instructions without touching global state.
#[derive(Debug, Clone)]
pub struct TranslationRules {
    instructions: HashMap<TranslationMode, String>,
}

impl Default for TranslationRules {
    fn default() -> Self {
        let mut instructions = HashMap::new();
        instructions.insert(
            TranslationMode::Bilingual,
            "Translate the user's text into both English and Chinese, \
             with the English line on top and the Chinese line below."
                .to_string(),
        );
        instructions.insert(
            TranslationMode::English,
            "Translate the user's text into English.".to_string(),
        );
        instructions.insert(
            TranslationMode::Chinese,
            "Translate the user's text into Chinese.".to_string(),
        );
        Self { instructions }
    }
}

impl TranslationRules {
    /// Create a rules table with custom instructions
    pub fn new(instructions: HashMap<TranslationMode, String>) -> Self {
        Self { instructions }
    }

    /// The raw instruction text for a mode
    pub fn instruction(&self, mode: TranslationMode) -> &str {
        // Every enum variant is present in the default table; a custom table
        // missing a mode falls back to a plain instruction.
        self.instructions
            .get(&mode)
            .map(|s| s.as_str())
            .unwrap_or("Translate the user's text.")
    }

    /// The full system prompt for a mode
    pub fn system_prompt(&self, mode: TranslationMode) -> String {
        format!(
            "You are a translation assistant. Translation rules:\n{}",
            self.instruction(mode)
        )
    }
}

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            start_time: Instant::now(),
            model: String::new(),
        }
    }

    /// Create new token usage stats with model info
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::new()
        }
    }

    /// Add token usage from one API call
    pub fn add_usage(&mut self, prompt_tokens: u64, completion_tokens: u64) {
        self.prompt_tokens += prompt_tokens;
        self.completion_tokens += completion_tokens;
        self.total_tokens += prompt_tokens + completion_tokens;
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        let elapsed_minutes = self.start_time.elapsed().as_secs_f64() / 60.0;

        format!(
            "Token Usage Summary:\n\
             Model: {}\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             Elapsed time: {:.2} minutes",
            self.model, self.prompt_tokens, self.completion_tokens, self.total_tokens, elapsed_minutes
        )
    }
}
