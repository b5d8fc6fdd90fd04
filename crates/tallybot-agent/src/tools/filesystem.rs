//! Filesystem tools: directory creation plus the shared path policy used
//! by every tool that writes to disk.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tallybot_core::utils::expand_home;
use tracing::info;

use super::base::{parse_params, Tool};

// ─────────────────────────────────────────────
// Workspace path policy
// ─────────────────────────────────────────────

/// Where relative paths land and whether paths may leave that directory.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
    restrict: bool,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, restrict: bool) -> Self {
        Self {
            root: root.into(),
            restrict,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path.
    ///
    /// `~` expands to the home directory, relative paths join the workspace
    /// root, and `.`/`..` are folded lexically so not-yet-existing targets
    /// can be checked. With restriction on, anything outside the root is
    /// rejected.
    pub fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let path = path.trim();
        if path.is_empty() {
            anyhow::bail!("Path must not be empty");
        }

        let expanded = expand_home(path);
        let joined = if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        };
        let resolved = normalize(&joined);

        if self.restrict {
            let root = normalize(&absolute(&self.root)?);
            let target = normalize(&absolute(&resolved)?);
            if !target.starts_with(&root) {
                anyhow::bail!(
                    "Access denied: path '{}' is outside allowed directory '{}'",
                    target.display(),
                    root.display()
                );
            }
        }

        Ok(resolved)
    }
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Write `content` to `path`, creating parent directories first.
pub async fn write_text_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}

// ─────────────────────────────────────────────
// create_directory
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CreateDirectoryInput {
    directory_path: String,
}

/// Creates a directory and any missing parents. Idempotent.
pub struct CreateDirectoryTool {
    workspace: Workspace,
}

impl CreateDirectoryTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for CreateDirectoryTool {
    fn name(&self) -> &str {
        "create_directory"
    }

    fn description(&self) -> &str {
        "Create a new directory at the given path. Missing intermediate directories \
         are created too; an existing directory is not an error."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory_path": {
                    "type": "string",
                    "description": "Path of the directory to create, e.g. 'output/reports'"
                }
            },
            "required": ["directory_path"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let input: CreateDirectoryInput = parse_params(params)?;
        let path = self.workspace.resolve(&input.directory_path)?;

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create directory {}: {e}", path.display()))?;

        info!(path = %path.display(), "created directory");
        Ok(format!(
            "Successfully created directory (or it already existed): {}",
            path.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn params(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_resolve_relative_joins_root() {
        let ws = Workspace::new("/srv/work", false);
        assert_eq!(ws.resolve("out/page.html").unwrap(), PathBuf::from("/srv/work/out/page.html"));
        assert_eq!(ws.resolve("/tmp/x").unwrap(), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_resolve_empty_rejected() {
        let ws = Workspace::new("/srv/work", false);
        assert!(ws.resolve("  ").is_err());
    }

    #[test]
    fn test_restricted_workspace_blocks_escape() {
        let ws = Workspace::new("/srv/work", true);
        assert!(ws.resolve("reports/q1").is_ok());
        let err = ws.resolve("../etc/passwd").unwrap_err();
        assert!(err.to_string().contains("Access denied"));
        assert!(ws.resolve("/etc").is_err());
        assert!(ws.resolve("a/../../work/b").is_ok());
    }

    #[tokio::test]
    async fn test_create_directory_nested_and_idempotent() {
        let dir = TempDir::new().unwrap();
        let tool = CreateDirectoryTool::new(Workspace::new(dir.path(), true));

        let out = tool
            .execute(params(json!({"directory_path": "a/b/c"})))
            .await
            .unwrap();
        assert!(out.starts_with("Successfully created directory"));
        assert!(dir.path().join("a/b/c").is_dir());

        let again = tool
            .execute(params(json!({"directory_path": "a/b/c"})))
            .await
            .unwrap();
        assert_eq!(out, again);
    }

    #[tokio::test]
    async fn test_create_directory_over_file_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("taken"), "x").unwrap();
        let tool = CreateDirectoryTool::new(Workspace::new(dir.path(), false));

        let err = tool
            .execute(params(json!({"directory_path": "taken"})))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to create directory"));
    }

    #[tokio::test]
    async fn test_write_text_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep/nested/file.txt");
        write_text_file(&path, "hello").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }
}
