/*!
 * # subsmith
 *
 * A Rust library for translating, generating, and embedding video subtitles
 * with AI.
 *
 * ## Features
 *
 * - Parse and write SRT subtitle files
 * - Translate subtitles in batches with per-item fallback
 * - Bilingual output stacking translation over the original line
 * - Generate subtitles for videos from an embedded track or by transcribing
 *   the audio in chunks
 * - Embed finished subtitle files back into the video container
 * - Convert SRT files to styled ASS files from a JSON style sheet
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing, serialization, and timestamps
 * - `translation`: AI-powered translation:
 *   - `translation::core`: Translation rules and token accounting
 *   - `translation::batch`: Batch translation state machine
 *   - `translation::formatting`: Display-text assembly
 * - `media_tools`: ffmpeg/ffprobe wrappers (probing, audio extraction,
 *   subtitle extraction and embedding)
 * - `ass_converter`: SRT to styled ASS conversion
 * - `app_controller`: Main application controller
 * - `providers`: API clients:
 *   - `providers::openai`: OpenAI-compatible chat and transcription client
 *   - `providers::mock`: Scripted client for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod ass_converter;
pub mod errors;
pub mod media_tools;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, TranslationMode};
pub use app_controller::{translate_transcript_groups, Controller, SubtitleSource};
pub use subtitle_processor::{SubtitleEntry, TranscriptSegment};
pub use translation::{TranslationRules, Translator};
pub use errors::{AppError, ProviderError, SubtitleError, ToolError};
