use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{ChatClient, ChatMessage, ChatOutcome};
use crate::subtitle_processor::TranscriptSegment;

/// Client for an OpenAI-compatible API (chat completions and transcription)
pub struct OpenAi {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. "https://api.openai.com/v1"
    endpoint: String,
}

impl fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAi")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Chat completion request payload
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    /// The model to use
    model: &'a str,
    /// The messages for the conversation
    messages: Vec<WireMessage<'a>>,
    /// Streaming is collapsed server-side; always request the aggregate
    stream: bool,
}

/// Wire format of a chat message
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response payload
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    /// Generated choices; the first one carries the response text
    choices: Vec<ChatChoice>,
    /// Token usage information
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
struct TokenUsage {
    /// Number of prompt tokens
    prompt_tokens: u64,
    /// Number of completion tokens
    completion_tokens: u64,
}

/// Verbose transcription response with per-segment timing
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    /// Timed segments; absent when the service returns plain text only
    #[serde(default)]
    segments: Vec<WireTranscriptSegment>,
}

#[derive(Debug, Deserialize)]
struct WireTranscriptSegment {
    start: f64,
    end: f64,
    text: String,
}

impl OpenAi {
    /// Create a new client with the default request timeout
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_timeout(api_key, endpoint, 120)
    }

    /// Create a new client with a specific request timeout in seconds.
    ///
    /// The timeout bounds every call made through this client; retries are the
    /// caller's concern and each retry attempt gets the full timeout again.
    pub fn new_with_timeout(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Transcribe an audio file into timed segments.
    ///
    /// Returned times are relative to the start of the uploaded file; the
    /// caller applies any chunk offset. Segments whose text is empty after
    /// trimming are dropped.
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        model: &str,
    ) -> Result<Vec<TranscriptSegment>, ProviderError> {
        let bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|e| ProviderError::UploadError(format!("{:?}: {}", audio_path, e)))?;

        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let form = multipart::Form::new()
            .text("model", model.to_string())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .part(
                "file",
                multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str("audio/mpeg")
                    .map_err(|e| ProviderError::UploadError(e.to_string()))?,
            );

        let response = self
            .client
            .post(self.api_url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Transcription API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let transcription = response
            .json::<TranscriptionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(transcription
            .segments
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| TranscriptSegment {
                start_secs: s.start,
                end_secs: s.end,
                text: s.text.trim().to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl ChatClient for OpenAi {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> Result<ChatOutcome, ProviderError> {
        let request = ChatCompletionRequest {
            model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            stream: false,
        };

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Chat API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let text = completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| ProviderError::ParseError("response contained no choices".to_string()))?;

        let (input_tokens, output_tokens) = completion
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(ChatOutcome {
            text,
            input_tokens,
            output_tokens,
        })
    }
}
