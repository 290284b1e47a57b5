//! Image generation client
//!
//! Sends the prompt to an image-capable model with `responseModalities`
//! including `IMAGE` and returns the first inline image part.

use std::time::Instant;

use tracing::{debug, error, info};

use crate::config::{Config, ImageConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::llm::transport::ApiTransport;
use crate::llm::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageOutputConfig,
};

use super::types::{AspectRatio, ImageRequest, ImageResponse};

/// Image generation client
#[derive(Clone)]
pub struct ImageClient {
    transport: ApiTransport,
    config: ImageConfig,
}

impl std::fmt::Debug for ImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageClient")
            .field("base_url", &self.transport.base_url())
            .field("model", &self.config.model)
            .finish()
    }
}

/// Builder for ImageClient
#[derive(Default)]
pub struct ImageClientBuilder {
    llm: Option<LlmConfig>,
    image: Option<ImageConfig>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl ImageClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection configuration (base URL, timeout)
    pub fn llm_config(mut self, config: LlmConfig) -> Self {
        self.llm = Some(config);
        self
    }

    /// Set the image configuration (model, aspect ratio)
    pub fn image_config(mut self, config: ImageConfig) -> Self {
        self.image = Some(config);
        self
    }

    /// Set the API key (resolved from the environment when unset)
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the ImageClient
    pub fn build(self) -> Result<ImageClient> {
        let llm = self.llm.unwrap_or_default();
        let transport = ApiTransport::resolve(&llm, self.api_key, self.base_url, self.timeout_secs)?;

        Ok(ImageClient {
            transport,
            config: self.image.unwrap_or_default(),
        })
    }
}

impl ImageClient {
    /// Create a new ImageClient from the full configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        ImageClientBuilder::new()
            .llm_config(config.llm.clone())
            .image_config(config.image.clone())
            .build()
    }

    /// Create a new builder
    pub fn builder() -> ImageClientBuilder {
        ImageClientBuilder::new()
    }

    /// Get the configured image model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generate an image and return it as a data URI string
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let response = self.generate(&ImageRequest::new(prompt)).await?;
        Ok(response.data_uri())
    }

    /// Generate an image from a text prompt
    pub async fn generate(&self, request: &ImageRequest) -> Result<ImageResponse> {
        let start = Instant::now();

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let body = self.build_request(request)?;

        debug!(model = %model, "Sending image generation request");

        let response = match self.transport.generate(&model, &body).await {
            Ok(response) => response,
            Err(e) => {
                error!(model = %model, error = %e, "Image generation failed");
                return Err(e);
            }
        };

        let (image, caption) = extract_image(&response)?;
        let generation_time_ms = start.elapsed().as_millis() as u64;

        info!(
            model = %model,
            mime_type = %image.mime_type,
            bytes = image.data.len(),
            elapsed_ms = generation_time_ms,
            "Image generated"
        );

        Ok(ImageResponse {
            image,
            caption,
            model_used: response.model_version.clone().unwrap_or(model),
            generation_time_ms,
        })
    }

    fn build_request(&self, request: &ImageRequest) -> Result<GenerateContentRequest> {
        if request.prompt.trim().is_empty() {
            return Err(Error::InvalidInput("image prompt must not be empty".to_string()));
        }

        let aspect_ratio = match request.aspect_ratio {
            Some(ratio) => ratio,
            None => AspectRatio::parse(&self.config.aspect_ratio).ok_or_else(|| {
                Error::ConfigError(format!(
                    "invalid image.aspect_ratio '{}'",
                    self.config.aspect_ratio
                ))
            })?,
        };

        let generation_config = GenerationConfig {
            image_config: Some(ImageOutputConfig {
                aspect_ratio: aspect_ratio.to_string(),
            }),
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
            ..Default::default()
        };

        Ok(
            GenerateContentRequest::new(vec![Content::user(request.prompt.clone())])
                .with_generation_config(generation_config),
        )
    }
}

/// Pick the first inline image part, plus any accompanying text
fn extract_image(
    response: &GenerateContentResponse,
) -> Result<(crate::datauri::DataUri, Option<String>)> {
    let blob = response.first_image().ok_or(Error::NoImageData)?;
    let image = blob
        .to_data_uri()
        .map_err(|e| Error::ImageGenerationError(e.to_string()))?;

    Ok((image, response.text()))
}
