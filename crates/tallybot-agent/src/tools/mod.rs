//! Tool modules for the Tallybot agent.

pub mod base;
pub mod convert;
pub mod filesystem;
pub mod generate;
pub mod math;
pub mod registry;
pub mod result;
pub mod schema;

use std::sync::Arc;

use tallybot_core::config::ToolsConfig;
use tallybot_providers::LlmProvider;

use crate::error::RegistryError;
use convert::{TemperatureConversionTool, TimeConversionTool};
use filesystem::{CreateDirectoryTool, Workspace};
use generate::{HtmlGeneratorTool, PlanningTool, SubModel};
use math::{CalculatorTool, PercentageTool};

pub use base::{format_number, parse_params, Tool};
pub use registry::ToolRegistry;
pub use result::ToolResult;

/// Registry holding every built-in tool.
///
/// The generator tools call `provider` with `config.sub_model`.
pub fn builtin_registry(
    provider: Arc<dyn LlmProvider>,
    config: &ToolsConfig,
) -> Result<ToolRegistry, RegistryError> {
    let workspace = Workspace::new(
        tallybot_core::utils::expand_home(&config.workspace),
        config.restrict_to_workspace,
    );
    let html_model = SubModel::new(provider.clone(), &config.sub_model, config.html_max_tokens);
    let plan_model = SubModel::new(provider, &config.sub_model, config.plan_max_tokens);

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(CalculatorTool))?;
    tools.register(Arc::new(PercentageTool))?;
    tools.register(Arc::new(TemperatureConversionTool))?;
    tools.register(Arc::new(TimeConversionTool))?;
    tools.register(Arc::new(CreateDirectoryTool::new(workspace.clone())))?;
    tools.register(Arc::new(HtmlGeneratorTool::new(html_model, workspace.clone())))?;
    tools.register(Arc::new(PlanningTool::new(plan_model, workspace)))?;
    Ok(tools)
}
