//! Requests without a configured API key
//!
//! Kept in its own test binary: it clears the key variables from the process
//! environment, which must not race with other tests.

mod common;

use aurora_core::config::{API_KEY_ENV_VARS, LlmConfig, PLACEHOLDER_API_KEY};
use aurora_core::llm::GenerationClient;
use common::{MockResponse, MockServer, text_response};

#[tokio::test]
async fn test_missing_key_sends_placeholder() {
    for var in API_KEY_ENV_VARS {
        // SAFETY: the only test in this binary; no other thread reads the environment.
        unsafe { std::env::remove_var(var) };
    }

    let server = MockServer::start(MockResponse::json(200, text_response(&["Hi"]))).await;

    let config = LlmConfig {
        base_url: server.base_url.clone(),
        timeout_secs: 5,
        ..Default::default()
    };
    assert_eq!(config.resolved_api_key().unwrap(), None);

    let client = GenerationClient::new(config).unwrap();
    let text = client.generate_text("Hello", None, None).await.unwrap();
    assert_eq!(text, "Hi");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("x-goog-api-key"), Some(PLACEHOLDER_API_KEY));
}
