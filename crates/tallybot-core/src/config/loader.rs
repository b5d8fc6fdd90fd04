//! Config loader: reads `~/.tallybot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.tallybot/config.json`
//! 3. Environment variables `TALLYBOT_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(config_path)
}

/// Apply `TALLYBOT_*` environment variable overrides.
///
/// Supported overrides:
/// - `TALLYBOT_AGENT__MODEL`, `__MAX_TOKENS`, `__TEMPERATURE`,
///   `__MAX_TOOL_ITERATIONS`, `__SYSTEM_PROMPT`
/// - `TALLYBOT_PROVIDER__API_KEY`, `__API_BASE`
/// - `TALLYBOT_TOOLS__WORKSPACE`, `__RESTRICT_TO_WORKSPACE`, `__SUB_MODEL`
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_with(config, |key| std::env::var(key).ok())
}

fn apply_overrides_with(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    let agent = &mut config.agent;
    if let Some(val) = lookup("TALLYBOT_AGENT__MODEL") {
        agent.model = val;
    }
    if let Some(n) = lookup("TALLYBOT_AGENT__MAX_TOKENS").and_then(|v| v.parse().ok()) {
        agent.max_tokens = n;
    }
    if let Some(t) = lookup("TALLYBOT_AGENT__TEMPERATURE").and_then(|v| v.parse().ok()) {
        agent.temperature = t;
    }
    if let Some(n) = lookup("TALLYBOT_AGENT__MAX_TOOL_ITERATIONS").and_then(|v| v.parse().ok()) {
        agent.max_tool_iterations = n;
    }
    if let Some(val) = lookup("TALLYBOT_AGENT__SYSTEM_PROMPT") {
        agent.system_prompt = Some(val);
    }

    if let Some(val) = lookup("TALLYBOT_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = lookup("TALLYBOT_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }

    let tools = &mut config.tools;
    if let Some(val) = lookup("TALLYBOT_TOOLS__WORKSPACE") {
        tools.workspace = val;
    }
    if let Some(val) = lookup("TALLYBOT_TOOLS__RESTRICT_TO_WORKSPACE") {
        tools.restrict_to_workspace = val == "true" || val == "1";
    }
    if let Some(val) = lookup("TALLYBOT_TOOLS__SUB_MODEL") {
        tools.sub_model = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
