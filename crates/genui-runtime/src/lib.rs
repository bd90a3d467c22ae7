//! # genui-runtime
//!
//! Hosted LLM providers for the GenUI nodes.
//!
//! ## Providers
//!
//! - **Gemini**: `generateContent` REST API, text only
//! - **OpenAI**: chat completions with tool calling
//!
//! ## Usage
//!
//! ```rust,ignore
//! use genui_runtime::{HttpProviderFactory, ProviderConfig};
//!
//! let factory = HttpProviderFactory::new(ProviderConfig::from_env());
//! let provider = factory.create(ProviderKind::for_model("gpt-4o"), api_key)?;
//! let agent = AgentBuilder::new().provider(provider).build()?;
//! ```

pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use genui_core::{AgentError, LlmProvider, ProviderFactory, ProviderKind, Result};

/// Endpoint and transport settings shared by the HTTP providers
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Gemini API base, up to and including the version segment
    pub gemini_base_url: String,

    /// OpenAI API base, up to and including the version segment
    pub openai_base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            openai_base_url: "https://api.openai.com/v1".into(),
            timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let gemini_base_url = std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url);
        let openai_base_url = std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url);
        let timeout_secs = std::env::var("GENUI_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            gemini_base_url,
            openai_base_url,
            timeout_secs,
        }
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))
    }
}

/// Creates real HTTP providers
#[derive(Clone, Debug, Default)]
pub struct HttpProviderFactory {
    config: ProviderConfig,
}

impl HttpProviderFactory {
    pub const fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(ProviderConfig::from_env())
    }

    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn create(&self, kind: ProviderKind, api_key: String) -> Result<Arc<dyn LlmProvider>> {
        tracing::debug!(provider = %kind, "Creating provider");
        let provider: Arc<dyn LlmProvider> = match kind {
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(api_key, &self.config)?),
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(api_key, &self.config)?),
        };
        Ok(provider)
    }
}

// Re-export core types for convenience
pub use genui_core::{Agent, GenerationOptions, Message, ProviderReply, Role, Tool, ToolCatalog};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.gemini_base_url, "https://generativelanguage.googleapis.com/v1beta");
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_factory_picks_provider_by_kind() {
        let factory = HttpProviderFactory::default();
        let gemini = factory.create(ProviderKind::Gemini, "k".into()).unwrap();
        let openai = factory.create(ProviderKind::OpenAi, "k".into()).unwrap();
        assert_eq!(gemini.name(), "Gemini");
        assert_eq!(openai.name(), "OpenAI");
    }
}
