//! Single-shot LLM Nodes
//!
//! One provider call with the user prompt, no tools.

use async_trait::async_trait;

use genui_core::{AgentError, GenerationOptions, Message, ProviderKind, ProviderReply, resolve_api_key};

use crate::config::NodeContext;
use crate::error::Result;
use crate::node::Node;
use crate::port::{InputSpec, NodeDescriptor, NodeInputs, NodeOutput, OutputSpec};

/// Gemini models offered by the agent, default first
pub const GEMINI_AGENT_MODELS: [&str; 4] = [
    "gemini-3-flash-preview",
    "gemini-3-pro-preview",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
];

/// Gemini models offered by the Gemini node
pub const GEMINI_MODELS: [&str; 4] = [
    "gemini-3-pro-preview",
    "gemini-3-flash-preview",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
];

pub const GPT_MODELS: [&str; 3] = ["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"];

const DEFAULT_SYSTEM: &str = "You are a helpful assistant.";
const DEFAULT_PROMPT: &str = "Answer my question.";

/// Chat node bound to one provider family
pub struct ChatNode {
    kind: ProviderKind,
    ctx: NodeContext,
}

impl ChatNode {
    pub const fn gemini(ctx: NodeContext) -> Self {
        Self {
            kind: ProviderKind::Gemini,
            ctx,
        }
    }

    pub const fn gpt(ctx: NodeContext) -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            ctx,
        }
    }

    const fn label(&self) -> &'static str {
        match self.kind {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAi => "GPT",
        }
    }

    async fn generate(&self, api_key: String, prompt: &str, options: &GenerationOptions) -> genui_core::Result<String> {
        let provider = self.ctx.providers.create(self.kind, api_key)?;
        let reply = provider.generate(&[Message::user(prompt)], &[], options).await?;
        match reply {
            ProviderReply::FinalText(text) => Ok(text),
            ProviderReply::ToolCalls { calls, .. } => {
                tracing::warn!(node = self.label(), calls = calls.len(), "Unexpected tool calls without tools");
                Ok(String::new())
            }
        }
    }
}

#[async_trait]
impl Node for ChatNode {
    fn name(&self) -> &'static str {
        self.label()
    }

    async fn descriptor(&self) -> NodeDescriptor {
        let (display_name, description, model_input) = match self.kind {
            ProviderKind::Gemini => (
                "Gemini (GenUI)",
                "Calls a Gemini model to answer the prompt.",
                InputSpec::choice("model_name", GEMINI_MODELS, GEMINI_AGENT_MODELS[0]),
            ),
            ProviderKind::OpenAi => (
                "GPT (GenUI)",
                "Calls an OpenAI GPT model to answer the prompt.",
                InputSpec::choice("model_name", GPT_MODELS, GPT_MODELS[0]),
            ),
        };

        NodeDescriptor {
            name: self.name(),
            display_name,
            category: "GenUI/LLM",
            description,
            inputs: vec![
                InputSpec::string("api_key", ""),
                model_input,
                InputSpec::text("system_instruction", DEFAULT_SYSTEM),
                InputSpec::text("user_prompt", DEFAULT_PROMPT),
                InputSpec::temperature(),
                InputSpec::max_tokens(),
            ],
            outputs: vec![OutputSpec::string("response")],
            output_node: false,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let env = &self.ctx.env;
        let api_key = match resolve_api_key(inputs.string("api_key")?, self.kind, |k| env(k)) {
            Ok(key) => key,
            Err(e @ AgentError::MissingApiKey(_)) => {
                tracing::warn!(node = self.label(), "No API key supplied");
                return Ok(NodeOutput::value(e.user_message()));
            }
            Err(e) => return Err(e.into()),
        };

        #[allow(clippy::cast_possible_truncation)]
        let options = GenerationOptions {
            model: inputs.string("model_name")?.to_string(),
            temperature: inputs.float("temperature")? as f32,
            max_tokens: u32::try_from(inputs.int("max_tokens")?).unwrap_or(u32::MAX),
            system_instruction: inputs.string("system_instruction")?.to_string(),
        };
        tracing::info!(node = self.label(), model = %options.model, "Generating response");

        let text = match self.generate(api_key, inputs.string("user_prompt")?, &options).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(node = self.label(), error = %e, "Generation failed");
                format!("{} Error: {e}", self.label())
            }
        };
        Ok(NodeOutput::value(text))
    }
}
