//! HTTP matcher client (messages-style completion API)

use super::{MatcherError, SemanticMatcher};
use async_trait::async_trait;
use phylo_common::config::MatcherConfig;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const API_VERSION: &str = "2023-06-01";
const USER_AGENT: &str = concat!("phylo-resolver/", env!("CARGO_PKG_VERSION"));

/// Completion client for the semantic fallback
pub struct HttpMatcher {
    http_client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl HttpMatcher {
    /// Build a client; `timeout` bounds every request
    pub fn new(config: &MatcherConfig, api_key: &str, timeout: Duration) -> Result<Self, MatcherError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(API_VERSION),
        );
        let mut key = header::HeaderValue::from_str(api_key)
            .map_err(|e| MatcherError::Network(format!("Invalid API key header: {}", e)))?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| MatcherError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl SemanticMatcher for HttpMatcher {
    async fn complete(&self, prompt: &str) -> Result<String, MatcherError> {
        let url = format!("{}/messages", self.base_url);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending matcher request");

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| MatcherError::Network(format!("Matcher request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatcherError::Status(status.as_u16(), body));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| MatcherError::Parse(format!("Failed to parse matcher response: {}", e)))?;

        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}
