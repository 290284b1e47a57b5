//! Wire types for the hosted generation API
//!
//! These mirror the `generateContent` JSON format (camelCase fields). Only the
//! fields Aurora reads or writes are modelled; unknown response fields are
//! ignored.

use serde::{Deserialize, Serialize};

use crate::datauri::DataUri;
use crate::error::Result;

/// Role of a content turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human input
    User,
    /// Model output
    Model,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

/// Inline binary payload (base64 encoded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

impl Blob {
    /// Encode raw bytes as an inline blob
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let uri = DataUri::new(mime_type, bytes.to_vec());
        Self {
            data: uri.base64_payload(),
            mime_type: uri.mime_type,
        }
    }

    /// Decode into a [`DataUri`]
    pub fn to_data_uri(&self) -> Result<DataUri> {
        DataUri::from_base64(&self.mime_type, &self.data)
    }
}

/// A single part of a content turn: text or inline data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    /// Set on thought-summary parts when thinking output is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Create an inline data part
    pub fn inline_data(blob: Blob) -> Self {
        Self {
            inline_data: Some(blob),
            ..Default::default()
        }
    }

    /// Whether this part is a thought summary rather than answer text
    pub fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

/// A content turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        Self::user_parts(vec![Part::text(text)])
    }

    /// Create a user turn from parts
    pub fn user_parts(parts: Vec<Part>) -> Self {
        Self {
            role: Some(Role::User),
            parts,
        }
    }

    /// Create a model turn with a single text part
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some(Role::Model),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a role-less turn, as used for system instructions
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated answer text of all non-thought parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.is_thought())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

/// Thinking controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Token budget for thinking; `0` disables it, `-1` lets the model decide
    pub thinking_budget: i32,
}

/// Image output controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOutputConfig {
    pub aspect_ratio: String,
}

/// Generation parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageOutputConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Request body for `generateContent` and `streamGenerateContent`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Create a request from content turns
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Set the system instruction
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::instruction(instruction));
        self
    }

    /// Set generation parameters; an all-default config is omitted from the body
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = if config.is_empty() { None } else { Some(config) };
        self
    }
}

/// Reason a candidate stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop
    Stop,
    /// Max tokens reached
    MaxTokens,
    /// Blocked by the safety system
    Safety,
    /// Flagged as recitation
    Recitation,
    /// Image output blocked by the safety system
    ImageSafety,
    /// Unknown reason (catch-all)
    #[serde(other)]
    Other,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::MaxTokens => write!(f, "max_tokens"),
            FinishReason::Safety => write!(f, "safety"),
            FinishReason::Recitation => write!(f, "recitation"),
            FinishReason::ImageSafety => write!(f, "image_safety"),
            FinishReason::Other => write!(f, "other"),
        }
    }
}

/// A generated candidate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<FinishReason>,
}

/// Token usage information
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub thoughts_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Error envelope the service can return in place of a response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code, self.message.is_empty()) {
            (Some(code), false) => write!(f, "{} ({})", self.message, code),
            (Some(code), true) => write!(f, "error code {}", code),
            (None, false) => f.write_str(&self.message),
            (None, true) => f.write_str("unknown service error"),
        }
    }
}

/// Response body from `generateContent`, also each SSE chunk of a stream
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub model_version: Option<String>,
    /// Set when the service reports an error with a success status
    pub error: Option<ApiError>,
}

impl GenerateContentResponse {
    fn first_content(&self) -> Option<&Content> {
        self.candidates.first()?.content.as_ref()
    }

    /// Answer text of the first candidate, `None` when empty
    pub fn text(&self) -> Option<String> {
        let text = self.first_content()?.text();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Inline data parts of the first candidate, in order
    pub fn inline_data(&self) -> impl Iterator<Item = &Blob> {
        self.first_content()
            .into_iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.inline_data.as_ref())
    }

    /// First inline image of the first candidate
    pub fn first_image(&self) -> Option<&Blob> {
        self.inline_data().find(|b| b.mime_type.starts_with("image/"))
    }

    /// Finish reason of the first candidate
    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.candidates.first()?.finish_reason.as_ref()
    }
}

/// A text generation request as seen by callers
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    /// The user prompt; must not be blank
    pub prompt: String,
    /// Model override; the configured default is used when `None`
    pub model: Option<String>,
    /// System instruction steering the model
    pub system_instruction: Option<String>,
    /// Prior turns of a conversation, oldest first
    pub history: Vec<Content>,
}

impl TextRequest {
    /// Create a request for a prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            system_instruction: None,
            history: Vec::new(),
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the system instruction
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set the conversation history
    pub fn with_history(mut self, history: Vec<Content>) -> Self {
        self.history = history;
        self
    }

    /// All turns to send: history followed by the prompt
    pub fn contents(&self) -> Vec<Content> {
        let mut contents = self.history.clone();
        contents.push(Content::user(self.prompt.clone()));
        contents
    }
}

/// Result of a text generation call
#[derive(Debug, Clone)]
pub struct TextResponse {
    /// Generated text, or the fallback when the service returned none
    pub text: String,
    /// Model that served the request
    pub model: String,
    /// Finish reason reported by the service
    pub finish_reason: Option<FinishReason>,
    /// Token usage reported by the service
    pub usage: UsageMetadata,
}
