//! `tallybot init`: write the default configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use tallybot_core::config::{get_config_path, save_config, Config};

use crate::helpers::display_path;

/// Run the init command against the default config path.
pub fn run(force: bool) -> Result<()> {
    println!();
    println!("{}", "🧮 Tallybot Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path, force)? {
        println!("  {} created config at {}", "✓".green(), display_path(&config_path));
    } else {
        println!(
            "  {} config already exists at {} (use --force to overwrite)",
            "✓".green(),
            display_path(&config_path)
        );
    }

    println!();
    println!(
        "{}",
        "Set provider.apiKey in the config, or export ANTHROPIC_API_KEY / CLAUDE_API_KEY, then run `tallybot agent`."
            .dimmed()
    );
    println!();
    Ok(())
}

/// Returns `false` when the file exists and `force` is off.
fn write_default_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallybot_core::config::load_config;

    #[test]
    fn writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert!(write_default_config(&path, false).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"maxToolIterations\": 10"));

        std::fs::write(&path, "{\"agent\": {\"model\": \"gpt-4o\"}}").unwrap();
        assert!(!write_default_config(&path, false).unwrap());
        assert_eq!(load_config(Some(&path)).agent.model, "gpt-4o");
    }

    #[test]
    fn force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(write_default_config(&path, true).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("maxTokens"));
    }
}
