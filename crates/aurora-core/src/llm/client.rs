//! Text generation client
//!
//! Provides async access to the hosted generation API with:
//! - Single-response text generation
//! - Lazy SSE streaming with an in-band error fragment
//!
//! Every call is a single attempt. Errors are logged and returned; nothing is
//! retried.

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::{debug, error, info};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::streaming::{SseEvent, SseLineBuffer, StreamFragment, parse_sse_line};
use super::transport::ApiTransport;
use super::types::{
    GenerateContentRequest, GenerationConfig, TextRequest, TextResponse, ThinkingConfig,
};

/// Returned when the service produces no text
pub const NO_RESPONSE_FALLBACK: &str = "No response generated.";

/// Stream of generated fragments, ending with at most one `Failed`
pub type FragmentStream = BoxStream<'static, StreamFragment>;

/// Text generation client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct GenerationClient {
    transport: ApiTransport,
    config: LlmConfig,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("base_url", &self.transport.base_url())
            .field("default_model", &self.config.default_model)
            .finish()
    }
}

/// Builder for creating a GenerationClient
#[derive(Default)]
pub struct GenerationClientBuilder {
    config: Option<LlmConfig>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl GenerationClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the LLM configuration
    pub fn config(mut self, config: LlmConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the API key (resolved from the environment when unset)
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the GenerationClient
    pub fn build(self) -> Result<GenerationClient> {
        let config = self.config.unwrap_or_default();
        let transport =
            ApiTransport::resolve(&config, self.api_key, self.base_url, self.timeout_secs)?;

        Ok(GenerationClient { transport, config })
    }
}

impl GenerationClient {
    /// Create a new client from configuration, resolving the API key from the environment
    pub fn new(config: LlmConfig) -> Result<Self> {
        GenerationClientBuilder::new().config(config).build()
    }

    /// Create a new builder for GenerationClient
    pub fn builder() -> GenerationClientBuilder {
        GenerationClientBuilder::new()
    }

    /// Get the default model from configuration
    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    /// Generate text for a prompt, returning only the text
    pub async fn generate_text(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        model: Option<&str>,
    ) -> Result<String> {
        let mut request = TextRequest::new(prompt);
        request.system_instruction = system_instruction.map(str::to_string);
        request.model = model.map(str::to_string);

        Ok(self.generate(&request).await?.text)
    }

    /// Generate text for a request
    ///
    /// Returns [`NO_RESPONSE_FALLBACK`] as the text when the service answers
    /// without any text.
    pub async fn generate(&self, request: &TextRequest) -> Result<TextResponse> {
        let model = self.model_for(request);
        let body = self.build_request(request)?;

        let response = match self.transport.generate(&model, &body).await {
            Ok(response) => response,
            Err(e) => {
                error!(model = %model, error = %e, "Text generation failed");
                return Err(e);
            }
        };

        let usage = response.usage_metadata.clone().unwrap_or_default();
        info!(
            model = %model,
            input_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            "Text generation successful"
        );

        let text = response.text().unwrap_or_else(|| {
            debug!(model = %model, "Empty response, using fallback text");
            NO_RESPONSE_FALLBACK.to_string()
        });

        Ok(TextResponse {
            text,
            model: response.model_version.clone().unwrap_or(model),
            finish_reason: response.finish_reason().cloned(),
            usage,
        })
    }

    /// Stream generated text for a request
    ///
    /// The request is sent when the stream is first polled. Fragments arrive
    /// in order; on any failure a single [`StreamFragment::Failed`] is
    /// yielded and the stream ends.
    pub fn generate_stream(&self, request: &TextRequest) -> FragmentStream {
        let model = self.model_for(request);
        let body = self.build_request(request);
        let transport = self.transport.clone();

        let stream = async_stream::stream! {
            let body = match body {
                Ok(body) => body,
                Err(e) => {
                    error!(model = %model, error = %e, "Invalid stream request");
                    yield StreamFragment::Failed(e.to_string());
                    return;
                }
            };

            let response = match transport.open_stream(&model, &body).await {
                Ok(response) => response,
                Err(e) => {
                    error!(model = %model, error = %e, "Failed to open stream");
                    yield StreamFragment::Failed(e.to_string());
                    return;
                }
            };

            let mut bytes_stream = response.bytes_stream();
            let mut buffer = SseLineBuffer::new();
            let mut fragments = 0usize;

            while let Some(chunk_result) = bytes_stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let e = Error::NetworkError(e);
                        error!(model = %model, error = %e, fragments, "Stream interrupted");
                        yield StreamFragment::Failed(e.to_string());
                        return;
                    }
                };

                for line in buffer.push(&bytes) {
                    match parse_sse_line(&line) {
                        Some(SseEvent::Chunk(chunk)) => {
                            if let Some(text) = chunk.text() {
                                fragments += 1;
                                yield StreamFragment::Text(text);
                            }
                        }
                        Some(SseEvent::Error(msg)) => {
                            let e = Error::StreamError(msg);
                            error!(model = %model, error = %e, fragments, "Stream chunk rejected");
                            yield StreamFragment::Failed(e.to_string());
                            return;
                        }
                        None => {}
                    }
                }
            }

            if let Some(rest) = buffer.finish() {
                match parse_sse_line(&rest) {
                    Some(SseEvent::Chunk(chunk)) => {
                        if let Some(text) = chunk.text() {
                            fragments += 1;
                            yield StreamFragment::Text(text);
                        }
                    }
                    Some(SseEvent::Error(msg)) => {
                        let e = Error::StreamError(msg);
                        error!(model = %model, error = %e, fragments, "Truncated stream chunk");
                        yield StreamFragment::Failed(e.to_string());
                        return;
                    }
                    None => {}
                }
            }

            info!(model = %model, fragments, "Stream completed");
        };

        stream.boxed()
    }

    /// Stream plain text, with the error sentinel standing in for a failure
    pub fn generate_text_stream(
        &self,
        request: &TextRequest,
    ) -> impl futures_core::Stream<Item = String> + Send + 'static + use<> {
        self.generate_stream(request).map(StreamFragment::into_text)
    }

    fn model_for(&self, request: &TextRequest) -> String {
        request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone())
    }

    /// Build the wire request, rejecting blank prompts
    fn build_request(&self, request: &TextRequest) -> Result<GenerateContentRequest> {
        if request.prompt.trim().is_empty() {
            return Err(Error::InvalidInput("prompt must not be empty".to_string()));
        }

        let generation_config = GenerationConfig {
            temperature: self.config.temperature,
            thinking_config: self
                .config
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            ..Default::default()
        };

        let mut body =
            GenerateContentRequest::new(request.contents()).with_generation_config(generation_config);

        if let Some(instruction) = request
            .system_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            body = body.with_system_instruction(instruction);
        }

        Ok(body)
    }
}
