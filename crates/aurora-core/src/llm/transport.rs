//! HTTP transport shared by the generation, image and vision clients

use std::time::Duration;

use reqwest::Client as HttpClient;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::types::{GenerateContentRequest, GenerateContentResponse};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Authenticated HTTP access to the generation API
#[derive(Clone)]
pub(crate) struct ApiTransport {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl ApiTransport {
    /// Build a transport, filling unset options from configuration.
    ///
    /// A missing API key resolves to the placeholder (with a warning) rather
    /// than failing.
    pub(crate) fn resolve(
        config: &LlmConfig,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => config
                .api_key_or_placeholder()
                .map_err(|e| Error::ConfigError(e.to_string()))?,
        };

        let timeout_secs = timeout_secs.unwrap_or(config.timeout_secs);

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        let base_url = base_url.unwrap_or_else(|| config.base_url.clone());

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// Send a single `generateContent` request
    pub(crate) async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model, "generateContent");

        debug!(
            model = %model,
            contents = request.contents.len(),
            "Sending generateContent request"
        );

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();

        if !status.is_success() {
            return handle_error_response(status, response, model).await;
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMError(format!("Failed to parse response: {}", e)))?;

        match body.error {
            Some(error) => Err(Error::LLMError(format!("Service error: {}", error))),
            None => Ok(body),
        }
    }

    /// Open a `streamGenerateContent` SSE response
    pub(crate) async fn open_stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response> {
        let url = format!("{}?alt=sse", self.endpoint(model, "streamGenerateContent"));

        debug!(
            model = %model,
            contents = request.contents.len(),
            "Sending streamGenerateContent request"
        );

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();

        if !status.is_success() {
            return handle_error_response(status, response, model).await;
        }

        Ok(response)
    }
}

/// Handle error responses from the API
async fn handle_error_response<T>(
    status: reqwest::StatusCode,
    response: reqwest::Response,
    model: &str,
) -> Result<T> {
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body).unwrap_or(body);

    match status.as_u16() {
        400 => Err(Error::LLMError(format!("Bad request: {}", message))),
        401 | 403 => Err(Error::LLMError(format!(
            "Unauthorized: {}. Set the AURORA_API_KEY or GEMINI_API_KEY environment variable.",
            message
        ))),
        404 => Err(Error::ModelNotFound(model.to_string())),
        429 => {
            let wait_secs = extract_retry_after(&message).unwrap_or(60);
            Err(Error::RateLimited(wait_secs))
        }
        500..=599 => Err(Error::LLMError(format!(
            "Server error ({}): {}",
            status, message
        ))),
        _ => Err(Error::LLMError(format!("HTTP error {}: {}", status, message))),
    }
}

/// Extract `error.message` from the API's JSON error envelope
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    json.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract a retry delay such as "retry in 12.5s" from an error message
fn extract_retry_after(message: &str) -> Option<u64> {
    let lower = message.to_lowercase();
    let start = lower.find("retry in ")? + "retry in ".len();
    let digits: String = lower[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().map(|secs| secs.ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base_url: &str) -> ApiTransport {
        ApiTransport::resolve(
            &LlmConfig::default(),
            Some("test-key".to_string()),
            Some(base_url.to_string()),
            Some(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_strips_models_prefix() {
        let t = transport("https://example.com/v1beta/");
        assert_eq!(t.base_url(), "https://example.com/v1beta");
        assert_eq!(
            t.endpoint("models/gemini-2.5-flash", "generateContent"),
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            t.endpoint("gemini-2.5-flash", "streamGenerateContent"),
            "https://example.com/v1beta/models/gemini-2.5-flash:streamGenerateContent"
        );
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("API key not valid"));
        assert_eq!(extract_error_message("plain text"), None);
    }

    #[test]
    fn test_extract_retry_after() {
        assert_eq!(extract_retry_after("Quota exceeded. Please retry in 12.4s."), Some(13));
        assert_eq!(extract_retry_after("Please retry in 30s"), Some(30));
        assert_eq!(extract_retry_after("Quota exceeded"), None);
    }
}
