//! Tools that delegate content generation to a secondary LLM call:
//! `create_html_file` and `create_thinking_plan`.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tallybot_core::types::Message;
use tallybot_providers::{LlmProvider, LlmRequestConfig};
use tracing::{debug, info};

use super::base::{parse_params, Tool};
use super::filesystem::{write_text_file, Workspace};

/// Sampling temperature for generated artifacts.
const GENERATION_TEMPERATURE: f64 = 0.3;

/// A provider handle plus the model and token budget for one generator.
#[derive(Clone)]
pub struct SubModel {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
}

impl SubModel {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }

    /// Single-shot completion without tools. Blank output is an error.
    async fn complete(&self, prompt: String, what: &str) -> anyhow::Result<String> {
        let config = LlmRequestConfig {
            max_tokens: self.max_tokens,
            temperature: GENERATION_TEMPERATURE,
        };
        debug!(model = %self.model, what, "calling sub-model");
        let response = self
            .provider
            .chat(&[Message::user(prompt)], None, &self.model, &config)
            .await
            .map_err(|e| anyhow::anyhow!("{what} generation failed: {e}"))?;

        response
            .trimmed_content()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Generated {what} was empty"))
    }
}

/// Remove a surrounding markdown code fence, if the model added one.
fn strip_code_fence(text: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").ok());

    fence
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str())
        .trim()
}

// ─────────────────────────────────────────────
// create_html_file
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct HtmlInput {
    file_path: String,
    prompt_for_html: String,
}

/// Generates an HTML document with a sub-model and saves it.
pub struct HtmlGeneratorTool {
    sub_model: SubModel,
    workspace: Workspace,
}

impl HtmlGeneratorTool {
    pub fn new(sub_model: SubModel, workspace: Workspace) -> Self {
        Self {
            sub_model,
            workspace,
        }
    }
}

#[async_trait]
impl Tool for HtmlGeneratorTool {
    fn name(&self) -> &str {
        "create_html_file"
    }

    fn description(&self) -> &str {
        "Generate an HTML file from a description and save it to the given path. \
         Another AI model writes the HTML."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Where to save the HTML file, e.g. 'output/my_page.html'"
                },
                "prompt_for_html": {
                    "type": "string",
                    "description": "Detailed description of the page to generate"
                }
            },
            "required": ["file_path", "prompt_for_html"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let input: HtmlInput = parse_params(params)?;
        let path = self.workspace.resolve(&input.file_path)?;

        let prompt = format!(
            "Generate complete, well-formed HTML for the request below. \
             Output only the HTML document, with no explanation and no markdown code fences. \
             Close every tag. Put CSS in a <style> element in the <head> if styling is requested or implied, \
             and put any JavaScript for simple interactivity in a <script> element at the end of the <body>.\n\n\
             Request: {}",
            input.prompt_for_html
        );
        let raw = self.sub_model.complete(prompt, "HTML").await?;
        let html = strip_code_fence(&raw);
        if html.is_empty() {
            anyhow::bail!("Generated HTML was empty");
        }

        write_text_file(&path, html).await?;
        info!(path = %path.display(), bytes = html.len(), "saved generated HTML");
        Ok(format!(
            "Successfully generated HTML and saved to {}. Content length: {} bytes.",
            path.display(),
            html.len()
        ))
    }
}

// ─────────────────────────────────────────────
// create_thinking_plan
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PlanInput {
    prompt_for_plan: String,
    output_file_path: Option<String>,
}

/// Produces a step-by-step plan with a sub-model, optionally saving it.
pub struct PlanningTool {
    sub_model: SubModel,
    workspace: Workspace,
}

impl PlanningTool {
    pub fn new(sub_model: SubModel, workspace: Workspace) -> Self {
        Self {
            sub_model,
            workspace,
        }
    }
}

#[async_trait]
impl Tool for PlanningTool {
    fn name(&self) -> &str {
        "create_thinking_plan"
    }

    fn description(&self) -> &str {
        "Generate a step-by-step thinking plan for a complex task. \
         Optionally save the plan to a file."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt_for_plan": {
                    "type": "string",
                    "description": "The task or problem that needs a plan"
                },
                "output_file_path": {
                    "type": "string",
                    "description": "Optional path to save the plan to, e.g. 'output/plan.txt'"
                }
            },
            "required": ["prompt_for_plan"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let input: PlanInput = parse_params(params)?;
        let path = input
            .output_file_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| self.workspace.resolve(p))
            .transpose()?;

        let prompt = format!(
            "Write a clear, actionable, step-by-step plan for the request below. \
             Use numbered steps or bullet points. Output only the plan.\n\n\
             Request: {}",
            input.prompt_for_plan
        );
        let plan = self.sub_model.complete(prompt, "plan").await?;

        match path {
            Some(path) => {
                write_text_file(&path, &plan).await?;
                info!(path = %path.display(), "saved generated plan");
                Ok(format!(
                    "Successfully generated plan and saved to {}. Plan:\n{plan}",
                    path.display()
                ))
            }
            None => Ok(format!("Generated Plan:\n{plan}")),
        }
    }
}
