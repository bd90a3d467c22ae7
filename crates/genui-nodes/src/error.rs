//! Error Types for Node Execution

use thiserror::Error;

use genui_core::AgentError;
use genui_tools::ToolsError;

pub type Result<T> = std::result::Result<T, NodeError>;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid input '{name}': {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("Invalid filename_prefix: {0}")]
    InvalidPrefix(String),

    #[error("No free file counter left for '{0}'")]
    CounterExhausted(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Tools(#[from] ToolsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller supplied bad inputs, as opposed to a runtime failure
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_) | Self::InvalidInput { .. } | Self::InvalidPrefix(_)
        )
    }
}
