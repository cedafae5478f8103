/*!
 * Client abstractions for the hosted text-generation service.
 *
 * The `ChatClient` trait is the translation pipeline's only view of the
 * network: a single awaited call that either returns the aggregated response
 * text with token usage, or a `ProviderError`. Retry policy lives in the
 * batch translator, never here.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::errors::ProviderError;

/// A single chat message sent to the service
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Role of the message sender (system, user)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Final aggregate result of one chat call
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The generated text
    pub text: String,
    /// Number of input tokens consumed
    pub input_tokens: u64,
    /// Number of output tokens generated
    pub output_tokens: u64,
}

/// Boundary trait for the text-generation service
#[async_trait]
pub trait ChatClient: Send + Sync + Debug {
    /// Send one prompt and return the final aggregated response.
    ///
    /// Implementations make exactly one network call; transport and service
    /// errors are returned as-is so the caller can decide on retries.
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> Result<ChatOutcome, ProviderError>;
}

/// Injectable delay source so retry and pacing waits can be elided in tests
#[async_trait]
pub trait Pacer: Send + Sync + Debug {
    /// Wait for the given duration
    async fn pause(&self, duration: Duration);
}

/// Real-time pacer backed by the tokio timer
#[derive(Debug, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// No-op pacer for tests
#[derive(Debug, Default)]
pub struct NoopPacer;

#[async_trait]
impl Pacer for NoopPacer {
    async fn pause(&self, _duration: Duration) {}
}

pub mod openai;
pub mod mock;
