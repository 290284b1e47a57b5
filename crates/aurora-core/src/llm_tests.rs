//! LLM module tests
//!
//! Failure-path behaviour of the generation, image and vision clients against
//! a closed local port.

use futures_util::StreamExt;

use crate::config::LlmConfig;
use crate::error::Error;
use crate::image::ImageClient;
use crate::llm::{GenerationClient, STREAM_ERROR_SENTINEL, StreamFragment, TextRequest};
use crate::vision::{ANALYSIS_FAILED, VisionClient};

/// Base URL of a port nothing listens on
fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/v1beta", port)
}

fn test_config() -> LlmConfig {
    LlmConfig {
        default_model: "gemini-2.5-flash".to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn unreachable_client() -> GenerationClient {
    GenerationClient::builder()
        .config(test_config())
        .api_key("test-api-key")
        .base_url(unreachable_base_url())
        .build()
        .unwrap()
}

#[test]
fn test_generation_client_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GenerationClient>();
    assert_send_sync::<ImageClient>();
    assert_send_sync::<VisionClient>();
}

#[test]
fn test_generation_client_clone() {
    let client = unreachable_client();
    let cloned = client.clone();
    assert_eq!(format!("{:?}", client), format!("{:?}", cloned));
}

#[tokio::test]
async fn test_text_call_propagates_transport_error() {
    let result = unreachable_client()
        .generate_text("Hello", None, None)
        .await;

    match result {
        Err(Error::NetworkError(e)) => assert!(e.is_connect() || e.is_request()),
        other => panic!("Expected NetworkError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_text_call_rejects_empty_prompt() {
    let result = unreachable_client().generate_text("", None, None).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_stream_failure_yields_single_sentinel() {
    let client = unreachable_client();
    let fragments: Vec<StreamFragment> = client
        .generate_stream(&TextRequest::new("Count to three"))
        .collect()
        .await;

    assert_eq!(fragments.len(), 1);
    assert!(fragments[0].is_error());
    assert_eq!(fragments[0].as_text(), STREAM_ERROR_SENTINEL);
}

#[tokio::test]
async fn test_text_stream_failure_yields_sentinel_text() {
    let client = unreachable_client();
    let texts: Vec<String> = client
        .generate_text_stream(&TextRequest::new("Hi"))
        .collect()
        .await;

    assert_eq!(texts, vec![" [Error generating stream]".to_string()]);
}

#[tokio::test]
async fn test_stream_empty_prompt_yields_sentinel() {
    let client = unreachable_client();
    let texts: Vec<String> = client
        .generate_text_stream(&TextRequest::new(""))
        .collect()
        .await;

    assert_eq!(texts, vec![STREAM_ERROR_SENTINEL.to_string()]);
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let client = unreachable_client();
    // Building the stream must not touch the network; dropping it unpolled is fine.
    let stream = client.generate_stream(&TextRequest::new("never sent"));
    drop(stream);
}

#[tokio::test]
async fn test_vision_failure_resolves_to_fallback() {
    let client = VisionClient::builder()
        .llm_config(test_config())
        .api_key("test-api-key")
        .base_url(unreachable_base_url())
        .build()
        .unwrap();

    let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    let text = client.analyze(&png, "image/png", "What is this?").await;
    assert_eq!(text, ANALYSIS_FAILED);
    assert_eq!(text, "Failed to analyze image.");

    let err = client.try_analyze(&png, "image/png", "What is this?").await;
    assert!(matches!(err, Err(Error::NetworkError(_))));
}

#[tokio::test]
async fn test_image_failure_propagates() {
    let client = ImageClient::builder()
        .llm_config(test_config())
        .api_key("test-api-key")
        .base_url(unreachable_base_url())
        .build()
        .unwrap();

    let result = client.generate_image("a red circle").await;
    assert!(matches!(result, Err(Error::NetworkError(_))));
}

// Integration tests that require actual API access are marked with feature flag
#[cfg(feature = "integration-tests")]
mod integration {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_actual_api_call() {
        let config = Config::load().unwrap();
        let client = GenerationClient::new(config.llm).unwrap();

        let text = client
            .generate_text("Say 'Hello' and nothing else.", None, None)
            .await
            .unwrap();

        assert!(text.to_lowercase().contains("hello"));
    }

    #[tokio::test]
    async fn test_streaming_api_call() {
        let config = Config::load().unwrap();
        let client = GenerationClient::new(config.llm).unwrap();

        let mut stream = client.generate_stream(&TextRequest::new("Count from 1 to 3."));
        let mut content = String::new();

        while let Some(fragment) = stream.next().await {
            match fragment {
                StreamFragment::Text(text) => content.push_str(&text),
                StreamFragment::Failed(e) => panic!("Stream error: {}", e),
            }
        }

        assert!(content.contains('1'));
        assert!(content.contains('3'));
    }
}
