//! Generic HTTP-based LLM provider for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint via `reqwest` and maps
//! every failure (transport, HTTP status, undecodable body) onto
//! [`ProviderError`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use tallybot_core::config::ProviderConfig;
use tallybot_core::types::{ChatCompletionRequest, ChatCompletionResponse, LlmResponse, Message, ToolDefinition};

use crate::registry::{resolve_provider, ResolvedProvider};
use crate::traits::{LlmProvider, LlmRequestConfig, ProviderError};

/// Request timeout for a single completion call.
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A generic LLM provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Default model for this provider instance.
    default_model: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
    /// Display name of the matched provider.
    display_name: &'static str,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("provider", &self.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create a provider from resolved credentials.
    pub fn new(
        resolved: ResolvedProvider,
        extra_headers: Option<&std::collections::HashMap<String, String>>,
        model: &str,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        for (key, value) in extra_headers.into_iter().flatten() {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(val)) => {
                    headers.insert(name, val);
                }
                _ => warn!("Invalid header: {}={}", key, value),
            }
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpProvider {
            client,
            api_base: resolved.api_base,
            api_key: resolved.api_key,
            default_model: model.to_string(),
            extra_headers: headers,
            display_name: resolved.spec.display_name,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        let tools = tools.filter(|t| !t.is_empty());

        debug!(
            provider = self.display_name,
            model = %model,
            messages = messages.len(),
            tools = tools.map_or(0, |t| t.len()),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools: tools.map(|t| t.to_vec()),
            tool_choice: tools.map(|_| "auto".to_string()),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.display_name, error = %e, "HTTP request failed");
                ProviderError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = self.display_name,
                status = %status,
                body = %body,
                "API error"
            );
            return Err(if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                ProviderError::RateLimited(body)
            } else {
                ProviderError::Api {
                    status: status.as_u16(),
                    body,
                }
            });
        }

        let chat_resp = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(provider = self.display_name, error = %e, "Failed to parse LLM response");
            ProviderError::MalformedResponse(e.to_string())
        })?;

        let llm_resp = chat_resp
            .into_llm_response()
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".into()))?;

        debug!(
            provider = self.display_name,
            has_content = llm_resp.content.is_some(),
            tool_calls = llm_resp.tool_calls.len(),
            finish_reason = llm_resp.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );
        Ok(llm_resp)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        self.display_name
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build an `HttpProvider` for `model` from the provider config, reading
/// the API key from the environment when the config has none.
pub fn create_provider(model: &str, config: &ProviderConfig) -> Result<HttpProvider, String> {
    let resolved = resolve_provider(model, config, |key| std::env::var(key).ok()).ok_or_else(|| {
        format!(
            "No API key found for model '{}'. \
             Set TALLYBOT_PROVIDER__API_KEY or the provider's key (e.g. ANTHROPIC_API_KEY, CLAUDE_API_KEY, OPENAI_API_KEY).",
            model
        )
    })?;

    debug!(
        provider = resolved.spec.display_name,
        model = model,
        api_base = %resolved.api_base,
        "Creating LLM provider"
    );

    HttpProvider::new(resolved, config.extra_headers.as_ref(), model).map_err(|e| e.to_string())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_by_name;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_provider(api_base: &str) -> HttpProvider {
        let resolved = ResolvedProvider {
            spec: find_by_name("openai").unwrap(),
            api_key: "test-key-123".to_string(),
            api_base: api_base.to_string(),
        };
        HttpProvider::new(resolved, None, "gpt-4o").unwrap()
    }

    #[test]
    fn test_completions_url_trailing_slash() {
        let provider = make_provider("https://api.openai.com/v1/");
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_extra_headers() {
        let resolved = ResolvedProvider {
            spec: find_by_name("openrouter").unwrap(),
            api_key: "sk-or-1".into(),
            api_base: "https://openrouter.ai/api/v1".into(),
        };
        let mut headers = HashMap::new();
        headers.insert("X-Title".to_string(), "tallybot".to_string());
        headers.insert("bad header".to_string(), "x".to_string());
        let provider = HttpProvider::new(resolved, Some(&headers), "openrouter/auto").unwrap();
        assert!(provider.extra_headers.contains_key("x-title"));
        assert_eq!(provider.extra_headers.len(), 1);
        assert_eq!(provider.display_name(), "OpenRouter");
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "content": "27% of 401 is 108.27.", "tool_calls": null },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let resp = provider
            .chat(&[Message::user("What's 27% of 401?")], None, "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(resp.content.as_deref(), Some("27% of 401 is 108.27."));
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_chat_with_tool_calls() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "tool_choice": "auto" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-tools",
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [
                            {
                                "id": "call_a",
                                "type": "function",
                                "function": { "name": "convert_time", "arguments": "{\"value\": 3}" }
                            },
                            {
                                "id": "call_b",
                                "type": "function",
                                "function": { "name": "calculate", "arguments": "{}" }
                            }
                        ]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": null
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let tool_def = ToolDefinition::new(
            "convert_time",
            "Convert durations",
            serde_json::json!({"type": "object", "properties": {}}),
        );

        let resp = provider
            .chat(
                &[Message::user("3 days in seconds?")],
                Some(&[tool_def]),
                "gpt-4o",
                &LlmRequestConfig::default(),
            )
            .await
            .unwrap();

        assert!(resp.content.is_none());
        let ids: Vec<&str> = resp.tool_calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["call_a", "call_b"]);
    }

    #[tokio::test]
    async fn test_chat_sends_model_and_limits() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "max_tokens": 512
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-body",
                "choices": [{ "message": { "content": "ok" }, "finish_reason": "stop" }],
                "usage": null
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let config = LlmRequestConfig {
            max_tokens: 512,
            temperature: 0.2,
        };
        let resp = provider
            .chat(&[Message::user("test")], Some(&[]), "deepseek-chat", &config)
            .await
            .unwrap();

        assert_eq!(resp.content.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_chat_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let err = provider
            .chat(&[Message::user("Hello")], None, "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited(ref body) if body == "slow down"));
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let err = provider
            .chat(&[Message::user("Hello")], None, "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let err = provider
            .chat(&[Message::user("Hello")], None, "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "x", "choices": [], "usage": null
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let err = provider
            .chat(&[Message::user("Hello")], None, "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_chat_network_error() {
        // Nothing listens on port 1.
        let provider = make_provider("http://127.0.0.1:1");
        let err = provider
            .chat(&[Message::user("Hello")], None, "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[test]
    fn test_create_provider_from_config_key() {
        let config = ProviderConfig {
            api_key: "sk-ant-123".to_string(),
            api_base: None,
            extra_headers: None,
        };
        let provider = create_provider("claude-3-5-haiku-latest", &config).unwrap();
        assert_eq!(provider.display_name(), "Anthropic");
        assert_eq!(provider.default_model(), "claude-3-5-haiku-latest");
        assert_eq!(provider.api_base, "https://api.anthropic.com/v1");
    }
}
