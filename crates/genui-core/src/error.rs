//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error (transport, status or response shape)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider answered with a non-success HTTP status
    #[error("Provider returned HTTP {status}: {body}")]
    ProviderStatus { status: u16, body: String },

    /// Tool not found in catalog
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// No API key supplied and no environment fallback set
    #[error("API key is missing (set {0})")]
    MissingApiKey(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderStatus { status, .. } => {
                format!("The AI service rejected the request (HTTP {status}).")
            }
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::Tool(err) => format!("Tool error: {err}"),
            Self::MissingApiKey(_) => "Error: API Key is missing.".into(),
            Self::Config(msg) => format!("Configuration error: {msg}"),
        }
    }
}

/// Errors raised by a single tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments were missing or had the wrong shape
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_errors_convert_transparently() {
        let err: AgentError = ToolError::execution("boom").into();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.user_message(), "Tool error: boom");
    }

    #[test]
    fn missing_key_user_message_matches_node_output() {
        assert_eq!(
            AgentError::MissingApiKey("OPENAI_API_KEY").user_message(),
            "Error: API Key is missing."
        );
    }
}
