//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for the hosted chat backends so the
//! orchestration loop works with either one without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use genui_core::provider::{GenerationOptions, LlmProvider, ProviderReply};
//!
//! let reply = provider.generate(&messages, &catalog.schemas(), &options).await?;
//! match reply {
//!     ProviderReply::FinalText(text) => println!("{text}"),
//!     ProviderReply::ToolCalls { calls, .. } => { /* dispatch */ }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Default model for the agent and Gemini nodes
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gemini-2.5-pro", "gpt-4o")
    pub model: String,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System instruction, sent the way each provider expects it
    #[serde(default)]
    pub system_instruction: String,
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    8192
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_instruction: String::new(),
        }
    }
}

/// Normalized decision from one provider call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderReply {
    /// Terminal text
    FinalText(String),
    /// Tool invocations requested by the model, in provider order, with
    /// any text the model sent alongside them
    ToolCalls { text: String, calls: Vec<ToolCall> },
}

impl ProviderReply {
    /// Normalize a raw reply: any requested call makes it a tool request, an
    /// empty call list is a final answer.
    pub fn from_parts(text: Option<String>, calls: Vec<ToolCall>) -> Self {
        if calls.is_empty() {
            Self::FinalText(text.unwrap_or_default())
        } else {
            Self::ToolCalls {
                text: text.unwrap_or_default(),
                calls,
            }
        }
    }

    /// Tool request with no accompanying text
    pub const fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::ToolCalls {
            text: String::new(),
            calls,
        }
    }
}

/// Provider family, selected from the model name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    /// Models whose name contains "gemini" go to Gemini, everything else to OpenAI
    pub fn for_model(model: &str) -> Self {
        if model.to_lowercase().contains("gemini") {
            Self::Gemini
        } else {
            Self::OpenAi
        }
    }

    /// Environment variable holding the fallback API key
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "Gemini"),
            Self::OpenAi => write!(f, "OpenAI"),
        }
    }
}

/// Use the supplied key, or fall back to the provider's environment variable.
pub fn resolve_api_key<F>(explicit: &str, kind: ProviderKind, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = explicit.trim();
    if !explicit.is_empty() {
        return Ok(explicit.to_string());
    }

    lookup(kind.api_key_env())
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(AgentError::MissingApiKey(kind.api_key_env()))
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Run one chat turn. Any transport, status or parse failure is an `Err`;
    /// callers must not retry.
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<ProviderReply>;
}

/// Builds a provider for a family once the API key is known
pub trait ProviderFactory: Send + Sync {
    fn create(&self, kind: ProviderKind, api_key: String) -> Result<Arc<dyn LlmProvider>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 8192);
        assert_eq!(opts.model, "gemini-3-flash-preview");
        assert!(opts.system_instruction.is_empty());
    }

    #[test]
    fn test_provider_kind_from_model() {
        assert_eq!(ProviderKind::for_model("gemini-2.5-pro"), ProviderKind::Gemini);
        assert_eq!(ProviderKind::for_model("Gemini-3-Flash"), ProviderKind::Gemini);
        assert_eq!(ProviderKind::for_model("gpt-4o"), ProviderKind::OpenAi);
    }

    #[test]
    fn test_reply_normalization() {
        assert_eq!(
            ProviderReply::from_parts(None, Vec::new()),
            ProviderReply::FinalText(String::new())
        );
        let call = ToolCall::new("1", "t", "{}");
        assert_eq!(
            ProviderReply::from_parts(Some("thinking".into()), vec![call.clone()]),
            ProviderReply::ToolCalls {
                text: "thinking".into(),
                calls: vec![call],
            }
        );
    }

    #[test]
    fn test_resolve_api_key() {
        let none = |_: &str| None;
        let env = |name: &str| (name == "GEMINI_API_KEY").then(|| "from-env".to_string());

        assert_eq!(resolve_api_key("sk-1", ProviderKind::OpenAi, none).unwrap(), "sk-1");
        assert_eq!(resolve_api_key("", ProviderKind::Gemini, env).unwrap(), "from-env");
        assert!(matches!(
            resolve_api_key("", ProviderKind::OpenAi, env),
            Err(AgentError::MissingApiKey("OPENAI_API_KEY"))
        ));
        assert!(resolve_api_key("  ", ProviderKind::Gemini, |_: &str| Some(String::new())).is_err());
    }
}
