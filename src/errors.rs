/*!
 * Error types for the subsmith application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to the translation/transcription API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when sending an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error reading a local file that should be uploaded
    #[error("Failed to read upload file: {0}")]
    UploadError(String),
}

/// Errors that are caller-configuration mistakes: reported immediately, never retried
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Input file is missing
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Subtitle content could not be parsed into any valid entry
    #[error("No valid subtitle entries found in {0}")]
    NoEntries(String),

    /// The ASS style selection was empty
    #[error("At least one style name must be selected")]
    EmptyStyleList,

    /// A requested ASS style does not exist in the style sheet
    #[error("Unknown style '{name}', available styles: {available}")]
    UnknownStyle {
        /// The style name that was requested
        name: String,
        /// Comma-separated list of valid style names
        available: String,
    },
}

/// Errors from external media tools (ffmpeg/ffprobe)
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool could not be started
    #[error("Failed to run {tool}: {message}")]
    SpawnFailed {
        /// Tool binary name
        tool: String,
        /// Underlying error message
        message: String,
    },

    /// The tool exited with a non-zero status
    #[error("{tool} failed: {stderr}")]
    NonZeroExit {
        /// Tool binary name
        tool: String,
        /// Filtered stderr output
        stderr: String,
    },

    /// The tool did not finish within the allowed time
    #[error("{tool} timed out after {seconds}s")]
    Timeout {
        /// Tool binary name
        tool: String,
        /// Timeout that was exceeded
        seconds: u64,
    },

    /// The tool produced unusable output
    #[error("Failed to parse {tool} output: {message}")]
    BadOutput {
        /// Tool binary name
        tool: String,
        /// Underlying error message
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the API client
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from an external media tool
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
