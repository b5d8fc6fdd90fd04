//! Shared CLI helpers: response printing, path display, banner.

use std::path::Path;

use colored::Colorize;

/// Show `path` with the home directory abbreviated to `~`.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs_next::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

/// Print an agent response to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "🧮 Tallybot".cyan().bold());
    println!("{response}");
    println!();
}

/// Print a user-facing failure to stderr.
pub fn print_error(message: &str) {
    eprintln!("\n{} {message}\n", "✗".red().bold());
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🧮 Tallybot".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Type a message, \"/reset\" to start over, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn display_path_abbreviates_home() {
        if let Some(home) = dirs_next::home_dir() {
            assert_eq!(display_path(&home.join(".tallybot/config.json")), "~/.tallybot/config.json");
            assert_eq!(display_path(&home), "~");
        }
    }

    #[test]
    fn display_path_leaves_other_paths() {
        let path = PathBuf::from("/definitely/not/home/x");
        assert_eq!(display_path(&path), "/definitely/not/home/x");
    }
}
