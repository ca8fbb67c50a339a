// SPDX-License-Identifier: MIT

//! OpenAI API client for chat, transcription, and speech.
//!
//! Handles:
//! - Chat completions with tool definitions (agent + notification text)
//! - Speech-to-text via the transcription endpoint
//! - Text-to-speech returning raw MP3 bytes
//!
//! `new_mock()` builds an offline client with deterministic canned output;
//! `new_mock_failing()` builds one whose every call fails, for exercising
//! the failure paths.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const TRANSCRIBE_MODEL: &str = "gpt-4o-mini-transcribe";
const TTS_MODEL: &str = "gpt-4o-mini-tts";
const TTS_VOICE: &str = "alloy";

/// Canned reply used by the mock client.
pub const MOCK_REPLY: &str = "Absher Assistant: demo response.";

#[derive(Clone)]
enum Mode {
    Live { api_key: String },
    Mock,
    MockFailing,
}

/// OpenAI API client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    mode: Mode,
}

impl OpenAiClient {
    /// Create a live client with a bounded per-request timeout.
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout,
            mode: Mode::Live { api_key },
        }
    }

    /// Offline client returning canned responses (tests, local dev).
    pub fn new_mock() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "http://mock.invalid".to_string(),
            timeout: Duration::from_secs(1),
            mode: Mode::Mock,
        }
    }

    /// Offline client whose calls all fail.
    pub fn new_mock_failing() -> Self {
        Self {
            mode: Mode::MockFailing,
            ..Self::new_mock()
        }
    }

    /// One chat-completion round. Returns the assistant message, which may
    /// carry tool calls instead of content.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatMessage, AppError> {
        let api_key = match &self.mode {
            Mode::Live { api_key } => api_key,
            Mode::Mock => return Ok(ChatMessage::assistant(MOCK_REPLY)),
            Mode::MockFailing => {
                return Err(AppError::OpenAiApi("mock failure".to_string()));
            }
        };

        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model,
            messages,
            tools,
            temperature: 0.2,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::OpenAiApi(e.to_string()))?;

        let parsed: ChatCompletionResponse = Self::check_response_json(response).await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| AppError::OpenAiApi("empty choices in response".to_string()))
    }

    /// Single-prompt completion, used by the notification composer.
    pub async fn complete_text(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let messages = [ChatMessage::user(prompt)];
        let reply = self.chat(model, &messages, None).await?;
        reply
            .content
            .map(|c| c.trim().to_string())
            .ok_or_else(|| AppError::OpenAiApi("completion had no content".to_string()))
    }

    /// Transcribe an uploaded audio blob (language auto-detected).
    pub async fn transcribe(
        &self,
        file_name: &str,
        audio: Vec<u8>,
    ) -> Result<String, AppError> {
        let api_key = match &self.mode {
            Mode::Live { api_key } => api_key,
            Mode::Mock => return Ok("mock transcription".to_string()),
            Mode::MockFailing => {
                return Err(AppError::OpenAiApi("mock failure".to_string()));
            }
        };

        let url = format!("{}/audio/transcriptions", self.base_url);
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| AppError::OpenAiApi(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", TRANSCRIBE_MODEL)
            .text("response_format", "json");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::OpenAiApi(e.to_string()))?;

        let parsed: TranscriptionResponse = Self::check_response_json(response).await?;
        Ok(parsed.text)
    }

    /// Synthesize speech; returns MP3 bytes.
    pub async fn speech(&self, text: &str) -> Result<Vec<u8>, AppError> {
        let api_key = match &self.mode {
            Mode::Live { api_key } => api_key,
            Mode::Mock => return Ok(b"mock-audio".to_vec()),
            Mode::MockFailing => {
                return Err(AppError::OpenAiApi("mock failure".to_string()));
            }
        };

        let url = format!("{}/audio/speech", self.base_url);
        let body = serde_json::json!({
            "model": TTS_MODEL,
            "voice": TTS_VOICE,
            "input": text,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::OpenAiApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::OpenAiApi(format!("HTTP {status}: {body}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::OpenAiApi(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("OpenAI rate limit hit (429)");
            }
            return Err(AppError::OpenAiApi(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::OpenAiApi(format!("JSON parse error: {e}")))
    }
}

// ─── Wire types ──────────────────────────────────────────────

/// A chat message in OpenAI wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: &str) -> Self {
        Self::plain("user", content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::plain("assistant", content)
    }

    pub fn tool_result(tool_call_id: &str, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.to_string()),
        }
    }

    fn plain(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

/// Function name + JSON-encoded arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON object, encoded as a string per the wire format.
    pub arguments: String,
}

/// A tool made available to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionSpec {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}
