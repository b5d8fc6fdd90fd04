//! `tallybot status`: show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use tallybot_core::config::{get_config_path, load_config};
use tallybot_core::utils::expand_home;
use tallybot_providers::registry::resolve_provider;
use tallybot_providers::PROVIDERS;

use crate::helpers::display_path;

fn check_mark(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();
    let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

    println!();
    println!("{}", "🧮 Tallybot Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        display_path(&config_path),
        check_mark(config_path.exists())
    );

    let agent = &config.agent;
    println!("  {:<18} {}", "Model:".bold(), agent.model);
    println!(
        "  {:<18} {} | {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", agent.temperature).dimmed(),
        format!("max_tokens: {}", agent.max_tokens).dimmed(),
        format!("max_iterations: {}", agent.max_tool_iterations).dimmed(),
    );

    // Provider selection
    let selected = resolve_provider(&agent.model, &config.provider, env);
    let provider_line = match &selected {
        Some(resolved) => format!(
            "{} {}",
            resolved.spec.display_name,
            format!("({})", resolved.api_base).dimmed()
        ),
        None => "no API key found".red().to_string(),
    };
    println!("  {:<18} {}", "Provider:".bold(), provider_line);

    println!();
    println!("  {}", "API keys:".bold());
    if config.provider.is_configured() {
        println!("    {:<20} {} (key set)", "config file", "✓".green());
    }
    for spec in PROVIDERS {
        let set_by = spec.env_keys.iter().find(|&&key| env(key).is_some());
        let status = match set_by {
            Some(key) => format!("{} ({key})", "✓".green()),
            None => format!("{}", "· not set".dimmed()),
        };
        println!("    {:<20} {}", spec.display_name, status);
    }

    // Tools
    let tools = &config.tools;
    let workspace = expand_home(&tools.workspace);
    println!();
    println!(
        "  {:<18} {} {}",
        "Workspace:".bold(),
        display_path(&workspace),
        check_mark(workspace.exists())
    );
    println!(
        "  {:<18} {}",
        "Restricted:".bold(),
        if tools.restrict_to_workspace { "yes" } else { "no" }
    );
    println!("  {:<18} {}", "Sub-model:".bold(), tools.sub_model);

    println!();

    Ok(())
}
