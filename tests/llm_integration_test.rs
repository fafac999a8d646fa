//! Integration tests for LLM connectivity and the drawing fallback.

use std::time::Duration;

use pictionary::{
    DrawingOptions, DrawingProvider, LlmClient, LlmConfig, LlmDrawingProvider, LlmProvider,
    placeholder_svg,
};
use tracing::instrument;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_connectivity() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY not set");

    let config = LlmConfig::new(
        LlmProvider::Anthropic,
        api_key,
        "claude-3-5-haiku-20241022".to_string(),
        50,
        0.0,
    );

    let client = LlmClient::new(config);

    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_draws_svg() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");

    let config = LlmConfig::new(
        LlmProvider::OpenAI,
        api_key,
        "gpt-4o-mini".to_string(),
        1000,
        0.7,
    );

    let provider = LlmDrawingProvider::new(LlmClient::new(config), DrawingOptions::default());
    let rendering = provider.render("house").await;

    assert!(rendering.as_str().starts_with("<svg"));
    eprintln!("Drawing: {} bytes", rendering.as_str().len());
}

#[tokio::test]
async fn test_unreachable_provider_falls_back_to_placeholder() {
    let config = LlmConfig::new(
        LlmProvider::OpenAI,
        "sk-test".to_string(),
        "gpt-4o-mini".to_string(),
        100,
        0.7,
    )
    .with_base_url(Some("http://127.0.0.1:9/v1".to_string()));

    let options = DrawingOptions::new(200, 100, Duration::from_secs(5));
    let provider = LlmDrawingProvider::new(LlmClient::new(config), options);
    let rendering = provider.render("castle").await;

    assert_eq!(rendering.as_str(), placeholder_svg("castle", 200, 100));
}
