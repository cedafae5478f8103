/*!
 * Mock chat client for testing translation behavior.
 *
 * Supports scripted responses (consumed in order) with a fallback behavior
 * once the script is exhausted, and records every call so tests can assert
 * on prompt contents and call ordering.
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::ProviderError;
use crate::providers::{ChatClient, ChatMessage, ChatOutcome};

/// Fallback behavior once scripted responses run out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echo the user prompt wrapped in a translation marker
    Working,
    /// Always fail with a simulated service error
    Failing,
}

/// One recorded chat call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// System message content, empty if absent
    pub system: String,
    /// User message content, empty if absent
    pub user: String,
}

/// Mock implementation of the chat boundary
#[derive(Debug)]
pub struct MockChatClient {
    /// Scripted responses, consumed front to back
    responses: Mutex<VecDeque<Result<String, String>>>,
    /// Behavior once the script is exhausted
    fallback: MockBehavior,
    /// Every call made, in order
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockChatClient {
    /// Create a mock that always echoes a marked translation
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that always fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    fn new(fallback: MockBehavior) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful scripted response
    pub fn push_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue a scripted failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Err(message.into()));
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of all recorded calls
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, messages: &[ChatMessage]) -> RecordedCall {
        let system = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let user = messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let call = RecordedCall { system, user };
        self.calls.lock().unwrap().push(call.clone());
        call
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn chat(&self, messages: &[ChatMessage], _model: &str) -> Result<ChatOutcome, ProviderError> {
        let call = self.record(messages);

        if let Some(scripted) = self.responses.lock().unwrap().pop_front() {
            return match scripted {
                Ok(text) => Ok(ChatOutcome {
                    input_tokens: call.user.len() as u64,
                    output_tokens: (text.len() / 2) as u64,
                    text,
                }),
                Err(message) => Err(ProviderError::ApiError {
                    status_code: 503,
                    message,
                }),
            };
        }

        match self.fallback {
            MockBehavior::Working => Ok(ChatOutcome {
                text: format!("[TX] {}", call.user),
                input_tokens: call.user.len() as u64,
                output_tokens: (call.user.len() / 2) as u64,
            }),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
        }
    }
}
