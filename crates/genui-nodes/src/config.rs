//! Node Configuration
//!
//! Directories and files the nodes read from and write to, plus the shared
//! context handed to every node at registration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use genui_core::ProviderFactory;

/// Environment variable lookup, injectable so tests never touch the process env
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

/// Filesystem and transport settings for the node set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeConfig {
    /// Files offered to `ReadTextFileTool`
    pub input_dir: PathBuf,

    /// Root for `UIRender` output and `/view`
    pub output_dir: PathBuf,

    /// Reference text appended to the agent's system instruction
    pub reference_file: Option<PathBuf>,

    /// Timeout for API tool requests
    pub tool_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            reference_file: None,
            tool_timeout: Duration::from_secs(120),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            input_dir: non_blank("GENUI_INPUT_DIR").map_or(defaults.input_dir, PathBuf::from),
            output_dir: non_blank("GENUI_OUTPUT_DIR").map_or(defaults.output_dir, PathBuf::from),
            reference_file: non_blank("GENUI_REFERENCE_FILE").map(PathBuf::from),
            tool_timeout: non_blank("GENUI_REQUEST_TIMEOUT_SECS")
                .and_then(|t| t.trim().parse().ok())
                .map_or(defaults.tool_timeout, Duration::from_secs),
        }
    }
}

/// Everything a node needs besides its inputs
#[derive(Clone)]
pub struct NodeContext {
    pub config: Arc<NodeConfig>,
    pub providers: Arc<dyn ProviderFactory>,
    pub env: EnvLookup,
}

impl NodeContext {
    pub fn new(config: NodeConfig, providers: Arc<dyn ProviderFactory>) -> Self {
        Self {
            config: Arc::new(config),
            providers,
            env: process_env(),
        }
    }

    #[must_use]
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }
}

impl std::fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
