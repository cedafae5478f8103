/*!
 * Subtitle translation pipeline.
 *
 * - `core`: mode-to-instruction rules table and token usage accounting
 * - `batch`: the batch translator with delimiter parsing and per-item fallback
 * - `formatting`: final display-text assembly per translation mode
 */

pub mod core;
pub mod batch;
pub mod formatting;

pub use batch::Translator;
pub use core::{TranslationRules, TokenUsageStats};
