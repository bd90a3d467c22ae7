//! # genui-core
//!
//! Tool-calling orchestration for the GenUI node pack: a provider-agnostic
//! LLM abstraction, a deduplicating tool catalog, and the bounded agent loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tool     │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Catalog   │──│   (Gemini / OpenAI) │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Providers return a normalized [`ProviderReply`]; the loop never sees
//! provider wire shapes.

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod run;
pub mod tool;

pub use error::{AgentError, Result, ToolError};
pub use message::{Content, ContentPart, Conversation, Message, Role};
pub use provider::{
    GenerationOptions, LlmProvider, ProviderFactory, ProviderKind, ProviderReply, resolve_api_key,
};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use run::{OrchestrationRun, RunOutcome, RunReport};
pub use tool::{Tool, ToolArgs, ToolCall, ToolCatalog, ToolInput, ToolRef, ToolResult, ToolSchema};
