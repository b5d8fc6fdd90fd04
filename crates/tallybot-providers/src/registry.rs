//! Provider registry: static specs for the supported LLM providers.
//!
//! Each `ProviderSpec` describes how to reach one OpenAI-compatible
//! `/chat/completions` endpoint: keywords for model matching, where to find
//! the API key in the environment, and the default API base.

use tallybot_core::config::ProviderConfig;

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"openrouter"`).
    pub name: &'static str,
    /// Keywords to match in model names (lowercase). E.g. `&["claude", "anthropic"]`.
    pub keywords: &'static [&'static str],
    /// Environment variables consulted for the API key, in order.
    pub env_keys: &'static [&'static str],
    /// Human-readable name for logs. E.g. `"OpenRouter"`.
    pub display_name: &'static str,
    /// Whether this is a gateway/aggregator. Gateways are never matched by
    /// model keyword, only by key prefix or base URL.
    pub is_gateway: bool,
    /// If the API key starts with this prefix, auto-detect this provider.
    pub detect_by_key_prefix: Option<&'static str>,
    /// If the API base URL contains this substring, auto-detect.
    pub detect_by_base_keyword: Option<&'static str>,
    /// Default API base URL.
    pub default_api_base: &'static str,
}

/// Supported providers, in matching priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openrouter",
        keywords: &["openrouter"],
        env_keys: &["OPENROUTER_API_KEY"],
        display_name: "OpenRouter",
        is_gateway: true,
        detect_by_key_prefix: Some("sk-or-"),
        detect_by_base_keyword: Some("openrouter"),
        default_api_base: "https://openrouter.ai/api/v1",
    },
    // Anthropic's OpenAI SDK compatibility endpoint.
    ProviderSpec {
        name: "anthropic",
        keywords: &["anthropic", "claude"],
        env_keys: &["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"],
        display_name: "Anthropic",
        is_gateway: false,
        detect_by_key_prefix: Some("sk-ant-"),
        detect_by_base_keyword: Some("anthropic"),
        default_api_base: "https://api.anthropic.com/v1",
    },
    ProviderSpec {
        name: "openai",
        keywords: &["openai", "gpt"],
        env_keys: &["OPENAI_API_KEY"],
        display_name: "OpenAI",
        is_gateway: false,
        detect_by_key_prefix: None,
        detect_by_base_keyword: Some("api.openai.com"),
        default_api_base: "https://api.openai.com/v1",
    },
    ProviderSpec {
        name: "deepseek",
        keywords: &["deepseek"],
        env_keys: &["DEEPSEEK_API_KEY"],
        display_name: "DeepSeek",
        is_gateway: false,
        detect_by_key_prefix: None,
        detect_by_base_keyword: Some("deepseek"),
        default_api_base: "https://api.deepseek.com/v1",
    },
    ProviderSpec {
        name: "groq",
        keywords: &["groq", "llama", "mixtral"],
        env_keys: &["GROQ_API_KEY"],
        display_name: "Groq",
        is_gateway: false,
        detect_by_key_prefix: Some("gsk_"),
        detect_by_base_keyword: Some("groq"),
        default_api_base: "https://api.groq.com/openai/v1",
    },
];

// ─────────────────────────────────────────────
// Lookup helpers
// ─────────────────────────────────────────────

/// Find a non-gateway provider spec by keyword match on the model name.
pub fn find_by_model(model: &str) -> Option<&'static ProviderSpec> {
    let model_lower = model.to_lowercase();
    PROVIDERS.iter().find(|spec| {
        !spec.is_gateway && spec.keywords.iter().any(|kw| model_lower.contains(kw))
    })
}

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Detect a provider from the API key prefix or the API base URL.
pub fn detect(api_key: &str, api_base: Option<&str>) -> Option<&'static ProviderSpec> {
    if !api_key.is_empty() {
        if let Some(spec) = PROVIDERS
            .iter()
            .find(|s| s.detect_by_key_prefix.is_some_and(|pfx| api_key.starts_with(pfx)))
        {
            return Some(spec);
        }
    }

    let base_lower = api_base?.to_lowercase();
    PROVIDERS.iter().find(|s| {
        s.detect_by_base_keyword
            .is_some_and(|kw| base_lower.contains(kw))
    })
}

/// A provider spec together with the credentials to use with it.
#[derive(Clone, Debug)]
pub struct ResolvedProvider {
    pub spec: &'static ProviderSpec,
    pub api_key: String,
    pub api_base: String,
}

/// Pick the provider for `model` and resolve its key and base URL.
///
/// Detection order: explicit key prefix / base URL in `config`, then model
/// keyword, then OpenAI as the generic OpenAI-compatible fallback.
/// The key comes from `config.api_key` or, when empty, from the spec's
/// environment variables via `lookup`.
///
/// Returns `None` when no API key can be found.
pub fn resolve_provider(
    model: &str,
    config: &ProviderConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<ResolvedProvider> {
    let spec = detect(&config.api_key, config.api_base.as_deref())
        .or_else(|| find_by_model(model))
        .or_else(|| find_by_name("openai"))?;

    let api_key = if config.is_configured() {
        config.api_key.clone()
    } else {
        spec.env_keys
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.is_empty()))?
    };

    let api_base = config
        .api_base
        .clone()
        .unwrap_or_else(|| spec.default_api_base.to_string());

    Some(ResolvedProvider {
        spec,
        api_key,
        api_base,
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
