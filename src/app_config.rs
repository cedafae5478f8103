use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Translation mode applied to every subtitle entry
    #[serde(default)]
    pub mode: TranslationMode,

    /// Provider settings (endpoint, models, API key)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Batch translation settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Audio transcription settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation mode selecting what the service should produce per entry
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    // @mode: Stacked translation + original
    #[default]
    Bilingual,
    // @mode: English only
    English,
    // @mode: Chinese only
    Chinese,
}

impl TranslationMode {
    // @returns: Capitalized mode name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Bilingual => "Bilingual",
            Self::English => "English",
            Self::Chinese => "Chinese",
        }
    }

    // @returns: Lowercase mode identifier, used in output filenames
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Bilingual => "bilingual".to_string(),
            Self::English => "english".to_string(),
            Self::Chinese => "chinese".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bilingual" => Ok(Self::Bilingual),
            "english" => Ok(Self::English),
            "chinese" => Ok(Self::Chinese),
            _ => Err(anyhow!("Invalid translation mode: {}", s)),
        }
    }
}

/// Provider (API) configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Text model used for translation
    #[serde(default = "default_text_model")]
    pub text_model: String,

    // @field: Audio model used for transcription
    #[serde(default = "default_audio_model")]
    pub audio_model: String,

    // @field: Service base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            text_model: default_text_model(),
            audio_model: default_audio_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Batch translation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchConfig {
    /// Maximum number of subtitle texts per batch call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batches smaller than this are translated item-by-item directly
    #[serde(default = "default_batch_min")]
    pub batch_min: usize,

    /// Retry count for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay in milliseconds between retry attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Pacing delay in milliseconds between consecutive per-item calls
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Pacing delay in milliseconds between consecutive batch calls
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_min: default_batch_min(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            pacing_delay_ms: default_pacing_delay_ms(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
        }
    }
}

/// Audio extraction and transcription settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AudioConfig {
    /// Duration of each extracted audio chunk in seconds
    #[serde(default = "default_chunk_secs")]
    pub chunk_secs: u64,

    /// Audio sample rate passed to ffmpeg
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            chunk_secs: default_chunk_secs(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_audio_model() -> String {
    "whisper-1".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_min() -> usize {
    3
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000 // 1 second fixed delay between attempts
}

fn default_pacing_delay_ms() -> u64 {
    300 // 300ms between consecutive per-item calls
}

fn default_inter_batch_delay_ms() -> u64 {
    500 // 500ms between consecutive batch calls
}

fn default_chunk_secs() -> u64 {
    180
}

fn default_sample_rate() -> u32 {
    16000
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path.as_ref(), e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path.as_ref(), e))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.is_empty() {
            return Err(anyhow!("An API key is required for translation"));
        }

        url::Url::parse(&self.provider.endpoint)
            .map_err(|e| anyhow!("Invalid endpoint URL '{}': {}", self.provider.endpoint, e))?;

        if self.batch.batch_size == 0 {
            return Err(anyhow!("batch_size must be at least 1"));
        }

        if self.batch.batch_min > self.batch.batch_size {
            return Err(anyhow!(
                "batch_min ({}) cannot exceed batch_size ({})",
                self.batch.batch_min,
                self.batch.batch_size
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            mode: TranslationMode::default(),
            provider: ProviderConfig::default(),
            batch: BatchConfig::default(),
            audio: AudioConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
