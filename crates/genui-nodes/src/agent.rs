//! Orchestrator Agent Node
//!
//! Merges the connected tools into a catalog and runs the bounded agent
//! loop against the provider picked from the model name.

use async_trait::async_trait;
use std::path::Path;

use genui_core::{
    AgentBuilder, AgentError, ProviderKind, ToolCatalog, resolve_api_key,
    reasoning::DEFAULT_SYSTEM_INSTRUCTION,
};

use crate::config::NodeContext;
use crate::error::Result;
use crate::llm::{GEMINI_AGENT_MODELS, GPT_MODELS};
use crate::node::Node;
use crate::port::{InputSpec, NodeDescriptor, NodeInputs, NodeOutput, OutputSpec};

const DEFAULT_PROMPT: &str = "Check the weather in Seoul.";

pub struct OrchestratorAgentNode {
    ctx: NodeContext,
}

impl OrchestratorAgentNode {
    pub const fn new(ctx: NodeContext) -> Self {
        Self { ctx }
    }

    async fn system_instruction(&self, base: &str) -> String {
        let Some(path) = &self.ctx.config.reference_file else {
            return base.to_string();
        };
        match load_reference(path).await {
            Ok(Some(section)) => {
                tracing::info!(path = %path.display(), "Loaded reference data");
                format!("{base}{section}")
            }
            Ok(None) => {
                tracing::warn!(path = %path.display(), "Reference file not found");
                base.to_string()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load reference file");
                base.to_string()
            }
        }
    }
}

/// Reference text formatted as a system instruction suffix
async fn load_reference(path: &Path) -> std::io::Result<Option<String>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }
    let content = tokio::fs::read_to_string(path).await?;
    let label = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Some(format!(
        "\n\n=== Reference Data ({label}) ===\n{content}\n{}\n",
        "=".repeat(54)
    )))
}

#[async_trait]
impl Node for OrchestratorAgentNode {
    fn name(&self) -> &'static str {
        "OrchestratorAgentNode"
    }

    async fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: self.name(),
            display_name: "Orchestrator Agent (GenUI)",
            category: "GenUI/Agent",
            description: "Performs the task with the connected tools and outputs the result.",
            inputs: vec![
                InputSpec::string("api_key", ""),
                InputSpec::choice(
                    "model_name",
                    GEMINI_AGENT_MODELS.iter().chain(GPT_MODELS.iter()).copied(),
                    GEMINI_AGENT_MODELS[0],
                ),
                InputSpec::text("system_instruction", DEFAULT_SYSTEM_INSTRUCTION),
                InputSpec::text("user_prompt", DEFAULT_PROMPT),
                InputSpec::temperature().optional(),
                InputSpec::max_tokens().optional(),
                InputSpec::tool("tool"),
            ],
            outputs: vec![OutputSpec::string("output")],
            output_node: true,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let model = inputs.string("model_name")?;
        let kind = ProviderKind::for_model(model);
        let system_instruction = self.system_instruction(inputs.string("system_instruction")?).await;

        let env = &self.ctx.env;
        let api_key = match resolve_api_key(inputs.string("api_key")?, kind, |k| env(k)) {
            Ok(key) => key,
            Err(e @ AgentError::MissingApiKey(_)) => {
                tracing::warn!(provider = %kind, "No API key supplied");
                return Ok(NodeOutput::value(e.user_message()));
            }
            Err(e) => return Err(e.into()),
        };

        let catalog = ToolCatalog::build([inputs.tool("tool")]);
        tracing::info!(tools = ?catalog.names(), model = %model, "Starting orchestration");

        #[allow(clippy::cast_possible_truncation)]
        let temperature = inputs.float("temperature")? as f32;
        let max_tokens = u32::try_from(inputs.int("max_tokens")?).unwrap_or(u32::MAX);

        let agent = AgentBuilder::new()
            .provider(self.ctx.providers.create(kind, api_key)?)
            .tools(catalog)
            .model(model)
            .system_instruction(system_instruction)
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()?;

        let report = agent.run(inputs.string("user_prompt")?).await;
        Ok(NodeOutput::value(report.output))
    }
}
