//! Application State

use std::sync::Arc;

use genui_nodes::{NodeConfig, NodeRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registered GenUI nodes
    pub registry: Arc<NodeRegistry>,

    /// Input/output directories served by `/view`
    pub config: Arc<NodeConfig>,
}
