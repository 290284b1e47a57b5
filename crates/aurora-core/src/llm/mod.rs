//! LLM integration - hosted generation API
//!
//! This module provides:
//! - HTTP client for `generateContent` and `streamGenerateContent`
//! - Request/response types matching the API's JSON format
//! - SSE streaming with an in-band error fragment
//! - Multi-turn chat sessions

mod client;
mod session;
mod streaming;
pub(crate) mod transport;
mod types;

pub use client::{FragmentStream, GenerationClient, GenerationClientBuilder, NO_RESPONSE_FALLBACK};
pub use session::ChatSession;
pub use streaming::{STREAM_ERROR_SENTINEL, SseEvent, SseLineBuffer, StreamFragment, parse_sse_line};
pub use types::{
    ApiError, Blob, Candidate, Content, FinishReason, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, ImageOutputConfig, Part, Role, TextRequest, TextResponse, ThinkingConfig,
    UsageMetadata,
};
