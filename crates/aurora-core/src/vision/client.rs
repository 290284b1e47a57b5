//! Image analysis client

use tracing::{error, info};

use crate::config::{Config, LlmConfig, VisionConfig};
use crate::datauri::DataUri;
use crate::error::{Error, Result};
use crate::llm::transport::ApiTransport;
use crate::llm::{Blob, Content, GenerateContentRequest, NO_RESPONSE_FALLBACK, Part};

/// Returned by [`VisionClient::analyze`] when analysis fails
pub const ANALYSIS_FAILED: &str = "Failed to analyze image.";

/// Image analysis client
///
/// Sends one image plus a text prompt in a single multi-part turn.
#[derive(Clone)]
pub struct VisionClient {
    transport: ApiTransport,
    config: VisionConfig,
}

impl std::fmt::Debug for VisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionClient")
            .field("base_url", &self.transport.base_url())
            .field("model", &self.config.model)
            .finish()
    }
}

/// Builder for VisionClient
#[derive(Default)]
pub struct VisionClientBuilder {
    llm: Option<LlmConfig>,
    vision: Option<VisionConfig>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl VisionClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn llm_config(mut self, config: LlmConfig) -> Self {
        self.llm = Some(config);
        self
    }

    pub fn vision_config(mut self, config: VisionConfig) -> Self {
        self.vision = Some(config);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<VisionClient> {
        let llm = self.llm.unwrap_or_default();
        let transport = ApiTransport::resolve(&llm, self.api_key, self.base_url, self.timeout_secs)?;

        Ok(VisionClient {
            transport,
            config: self.vision.unwrap_or_default(),
        })
    }
}

impl VisionClient {
    /// Create a new VisionClient from the full configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        VisionClientBuilder::new()
            .llm_config(config.llm.clone())
            .vision_config(config.vision.clone())
            .build()
    }

    pub fn builder() -> VisionClientBuilder {
        VisionClientBuilder::new()
    }

    /// Get the configured vision model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Describe an image; failures become [`ANALYSIS_FAILED`]
    pub async fn analyze(&self, image: &[u8], mime_type: &str, prompt: &str) -> String {
        match self.try_analyze(image, mime_type, prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(model = %self.config.model, error = %e, "Image analysis failed");
                ANALYSIS_FAILED.to_string()
            }
        }
    }

    /// Describe an image held as a data URI; failures become [`ANALYSIS_FAILED`]
    pub async fn analyze_data_uri(&self, image: &DataUri, prompt: &str) -> String {
        self.analyze(&image.data, &image.mime_type, prompt).await
    }

    /// Describe an image, returning any error to the caller
    ///
    /// A blank prompt falls back to the configured default prompt.
    pub async fn try_analyze(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        let body = self.build_request(image, mime_type, prompt)?;
        let response = self.transport.generate(&self.config.model, &body).await?;

        info!(
            model = %self.config.model,
            mime_type = %mime_type,
            bytes = image.len(),
            "Image analysis successful"
        );

        Ok(response
            .text()
            .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string()))
    }

    fn build_request(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<GenerateContentRequest> {
        if image.is_empty() {
            return Err(Error::InvalidInput("image data must not be empty".to_string()));
        }
        if !mime_type.starts_with("image/") {
            return Err(Error::InvalidInput(format!(
                "unsupported MIME type for analysis: {}",
                mime_type
            )));
        }

        let prompt = if prompt.trim().is_empty() {
            self.config.default_prompt.as_str()
        } else {
            prompt
        };

        Ok(GenerateContentRequest::new(vec![Content::user_parts(vec![
            Part::inline_data(Blob::from_bytes(mime_type, image)),
            Part::text(prompt),
        ])]))
    }
}
