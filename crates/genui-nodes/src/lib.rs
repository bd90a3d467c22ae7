//! # genui-nodes
//!
//! The GenUI node set as a host sees it: typed input ports, descriptors and
//! a registry that validates inputs before a node runs.
//!
//! ## Nodes
//!
//! ```text
//! GenUI/Agent   OrchestratorAgentNode  APITool  ReadTextFileTool  ToolCollection
//! GenUI/LLM     Gemini  GPT
//! GenUI         UserTextInput  TextOutput  UIRender
//! ```
//!
//! Tool nodes emit a [`genui_core::ToolInput`]; the agent node merges what
//! it receives into a catalog and runs the orchestration loop.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod node;
pub mod port;
pub mod text;
pub mod tools;
pub mod ui_render;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::OrchestratorAgentNode;
pub use config::{EnvLookup, NodeConfig, NodeContext, process_env};
pub use error::{NodeError, Result};
pub use llm::ChatNode;
pub use node::{Node, NodeRegistry};
pub use port::{InputKind, InputSpec, NodeDescriptor, NodeInputs, NodeOutput, NodeValue, OutputSpec, UiPayload};
pub use text::{TextOutput, UserTextInput};
pub use tools::{ApiToolNode, ReadTextFileToolNode, ToolCollectionNode};
pub use ui_render::UiRenderNode;

impl NodeRegistry {
    /// Registry holding the full GenUI node set
    pub fn with_defaults(ctx: &NodeContext) -> Self {
        let mut registry = Self::new();
        registry.register(OrchestratorAgentNode::new(ctx.clone()));
        registry.register(ApiToolNode::new(ctx.clone()));
        registry.register(ReadTextFileToolNode::new(ctx.clone()));
        registry.register(ToolCollectionNode);
        registry.register(ChatNode::gemini(ctx.clone()));
        registry.register(ChatNode::gpt(ctx.clone()));
        registry.register(UserTextInput);
        registry.register(TextOutput);
        registry.register(UiRenderNode::new(ctx.clone()));

        tracing::info!(nodes = registry.len(), "Registered GenUI nodes");
        registry
    }
}
