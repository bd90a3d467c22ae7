//! Node Trait and Registry

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use genui_core::ToolInput;

use crate::error::{NodeError, Result};
use crate::port::{InputKind, NodeDescriptor, NodeInputs, NodeOutput, NodeValue, PortType};

/// A node the host can place in a graph
#[async_trait]
pub trait Node: Send + Sync {
    /// Registry key, stable across versions
    fn name(&self) -> &'static str;

    /// Ports and labels; may look at the filesystem for choice lists
    async fn descriptor(&self) -> NodeDescriptor;

    /// Run with inputs already validated against the descriptor
    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput>;
}

/// Registered nodes in registration order
#[derive(Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<Arc<dyn Node>>,
    index: HashMap<&'static str, usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, replacing any node with the same name
    pub fn register<N: Node + 'static>(&mut self, node: N) {
        let node: Arc<dyn Node> = Arc::new(node);
        let name = node.name();
        if let Some(&pos) = self.index.get(name) {
            self.nodes[pos] = node;
        } else {
            self.index.insert(name, self.nodes.len());
            self.nodes.push(node);
        }
        tracing::debug!(node = name, "Registered node");
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Node>> {
        self.index.get(name).map(|&pos| Arc::clone(&self.nodes[pos]))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub async fn descriptors(&self) -> Vec<NodeDescriptor> {
        let mut descriptors = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            descriptors.push(node.descriptor().await);
        }
        descriptors
    }

    /// Validate inputs and execute a node
    pub async fn execute(&self, name: &str, inputs: NodeInputs) -> Result<NodeOutput> {
        let node = self.get(name).ok_or_else(|| NodeError::UnknownNode(name.into()))?;
        let inputs = node.descriptor().await.validate(inputs)?;
        tracing::debug!(node = name, inputs = inputs.len(), "Executing node");
        node.execute(inputs).await
    }

    /// Execute a node from JSON inputs.
    ///
    /// Tool ports take a tool-node invocation `{"node": ..., "inputs": {...}}`
    /// or an array of them; those nodes run first and their tools are fed in.
    pub fn execute_json<'a>(
        &'a self,
        name: &'a str,
        raw: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = Result<NodeOutput>> + Send + 'a>> {
        Box::pin(async move {
            let node = self.get(name).ok_or_else(|| NodeError::UnknownNode(name.into()))?;
            let descriptor = node.descriptor().await;

            let mut inputs = NodeInputs::new();
            for (key, value) in raw {
                if value.is_null() {
                    continue;
                }
                let is_tool_port = descriptor
                    .input(key)
                    .is_some_and(|spec| spec.kind == InputKind::Tool);
                if is_tool_port {
                    inputs.insert(key.as_str(), self.resolve_tool(key, value).await?);
                } else {
                    let converted = NodeValue::from_json(value).ok_or_else(|| {
                        NodeError::invalid(key.as_str(), "expected a string or number")
                    })?;
                    inputs.insert(key.as_str(), converted);
                }
            }

            self.execute(name, inputs).await
        })
    }

    async fn resolve_tool(&self, port: &str, value: &Value) -> Result<ToolInput> {
        match value {
            Value::Array(items) => {
                let mut collected = Vec::with_capacity(items.len());
                for item in items {
                    collected.push(Some(self.run_tool_node(port, item).await?));
                }
                Ok(ToolInput::collect(collected))
            }
            other => self.run_tool_node(port, other).await,
        }
    }

    async fn run_tool_node(&self, port: &str, value: &Value) -> Result<ToolInput> {
        let invalid = || NodeError::invalid(port, "expected {\"node\": ..., \"inputs\": {...}}");
        let spec = value.as_object().ok_or_else(invalid)?;
        let node = spec.get("node").and_then(Value::as_str).ok_or_else(invalid)?;
        let empty = Map::new();
        let inputs = match spec.get("inputs") {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => &empty,
            Some(_) => return Err(invalid()),
        };

        let not_a_tool = || NodeError::invalid(port, format!("node {node} does not produce a tool"));
        let nested = self.get(node).ok_or_else(|| NodeError::UnknownNode(node.into()))?;
        let produces_tool = nested
            .descriptor()
            .await
            .outputs
            .first()
            .is_some_and(|output| output.kind == PortType::Tool);
        if !produces_tool {
            return Err(not_a_tool());
        }

        let output = self.execute_json(node, inputs).await?;
        match output.values.into_iter().next() {
            Some(NodeValue::Tool(tool)) => Ok(tool),
            _ => Err(not_a_tool()),
        }
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry").field("nodes", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{InputSpec, OutputSpec};
    use async_trait::async_trait;
    use genui_core::{Tool, ToolArgs, ToolError};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NamedTool(String);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            &self.0
        }

        fn description(&self) -> &str {
            "named"
        }

        async fn call(&self, _args: ToolArgs) -> std::result::Result<String, ToolError> {
            Ok(self.0.clone())
        }
    }

    /// Emits a tool named after its input
    struct MakeTool;

    #[async_trait]
    impl Node for MakeTool {
        fn name(&self) -> &'static str {
            "MakeTool"
        }

        async fn descriptor(&self) -> NodeDescriptor {
            NodeDescriptor {
                name: "MakeTool",
                display_name: "Make Tool",
                category: "Test",
                description: "",
                inputs: vec![InputSpec::string("name", "t")],
                outputs: vec![OutputSpec::tool("tool")],
                output_node: false,
            }
        }

        async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
            let name = inputs.string("name")?.to_string();
            Ok(NodeOutput::value(ToolInput::single(NamedTool(name))))
        }
    }

    /// Lists the tools it receives
    struct ListTools;

    #[async_trait]
    impl Node for ListTools {
        fn name(&self) -> &'static str {
            "ListTools"
        }

        async fn descriptor(&self) -> NodeDescriptor {
            NodeDescriptor {
                name: "ListTools",
                display_name: "List Tools",
                category: "Test",
                description: "",
                inputs: vec![InputSpec::tool("tool"), InputSpec::max_tokens()],
                outputs: vec![OutputSpec::string("names")],
                output_node: false,
            }
        }

        async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
            let names = inputs
                .tool("tool")
                .map(|t| t.tools().iter().map(|t| t.name().to_string()).collect::<Vec<_>>().join(","))
                .unwrap_or_default();
            Ok(NodeOutput::value(names))
        }
    }

    /// String-output node that counts its runs
    struct Counter {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Node for Counter {
        fn name(&self) -> &'static str {
            "Counter"
        }

        async fn descriptor(&self) -> NodeDescriptor {
            NodeDescriptor {
                name: "Counter",
                display_name: "Counter",
                category: "Test",
                description: "",
                inputs: Vec::new(),
                outputs: vec![OutputSpec::string("count")],
                output_node: true,
            }
        }

        async fn execute(&self, _inputs: NodeInputs) -> Result<NodeOutput> {
            let runs = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(NodeOutput::value(runs.to_string()))
        }
    }

    fn registry() -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        registry.register(MakeTool);
        registry.register(ListTools);
        registry
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_registry_basics() {
        let mut registry = registry();
        assert_eq!(registry.names(), vec!["MakeTool", "ListTools"]);
        registry.register(MakeTool);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("Nope").is_none());
        assert_eq!(registry.descriptors().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_node() {
        let err = registry().execute("Nope", NodeInputs::new()).await.unwrap_err();
        assert!(matches!(err, NodeError::UnknownNode(_)));
    }

    #[tokio::test]
    async fn test_nested_tool_invocations() {
        let raw = object(json!({
            "tool": [
                {"node": "MakeTool", "inputs": {"name": "a"}},
                {"node": "MakeTool", "inputs": {"name": "b"}},
                {"node": "MakeTool"}
            ]
        }));
        let output = registry().execute_json("ListTools", &raw).await.unwrap();
        assert_eq!(output.text(), Some("a,b,t"));
    }

    #[tokio::test]
    async fn test_single_tool_invocation_and_absent_port() {
        let registry = registry();
        let raw = object(json!({"tool": {"node": "MakeTool", "inputs": {"name": "solo"}}}));
        let output = registry.execute_json("ListTools", &raw).await.unwrap();
        assert_eq!(output.text(), Some("solo"));

        let output = registry.execute_json("ListTools", &object(json!({"tool": null}))).await.unwrap();
        assert_eq!(output.text(), Some(""));
    }

    #[tokio::test]
    async fn test_bad_json_inputs() {
        let registry = registry();

        let err = registry
            .execute_json("ListTools", &object(json!({"tool": "MakeTool"})))
            .await
            .unwrap_err();
        assert!(err.is_input_error());

        let err = registry
            .execute_json("ListTools", &object(json!({"tool": {"node": "ListTools"}})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not produce a tool"));

        let err = registry
            .execute_json("ListTools", &object(json!({"max_tokens": true})))
            .await
            .unwrap_err();
        assert!(err.is_input_error());

        let err = registry
            .execute_json("ListTools", &object(json!({"tool": {"node": "Ghost"}})))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::UnknownNode(name) if name == "Ghost"));
    }

    #[tokio::test]
    async fn test_non_tool_node_is_not_run_for_tool_port() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut registry = registry();
        registry.register(Counter { runs: runs.clone() });

        let err = registry
            .execute_json("ListTools", &object(json!({"tool": {"node": "Counter"}})))
            .await
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("does not produce a tool"));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
