//! Tool Nodes
//!
//! Nodes that produce tool definitions for the agent's `tool` port.

use async_trait::async_trait;

use genui_core::ToolInput;
use genui_tools::{HttpMethod, HttpTool, HttpToolConfig, ReadTextFileTool, list_input_files};

use crate::config::NodeContext;
use crate::error::{NodeError, Result};
use crate::node::Node;
use crate::port::{InputKind, InputSpec, NodeDescriptor, NodeInputs, NodeOutput, OutputSpec};

const CATEGORY: &str = "GenUI/Agent";

/// `APITool`: a REST endpoint the model can call
pub struct ApiToolNode {
    ctx: NodeContext,
}

impl ApiToolNode {
    pub const fn new(ctx: NodeContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Node for ApiToolNode {
    fn name(&self) -> &'static str {
        "APITool"
    }

    async fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: self.name(),
            display_name: "API Tool (GenUI)",
            category: CATEGORY,
            description: "Creates a tool that calls a REST API.",
            inputs: vec![
                InputSpec::string("name", "get_weather"),
                InputSpec::text(
                    "description",
                    "Get current weather for a location. Params: location (str)",
                ),
                InputSpec::string("url", "https://api.example.com/weather"),
                InputSpec::choice(
                    "method",
                    HttpMethod::ALL.map(HttpMethod::as_str),
                    HttpMethod::Get.as_str(),
                ),
                InputSpec::text("headers", "{}"),
            ],
            outputs: vec![OutputSpec::tool("tool")],
            output_node: false,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let config = HttpToolConfig {
            name: inputs.string("name")?.to_string(),
            description: inputs.string("description")?.to_string(),
            url: inputs.string("url")?.to_string(),
            method: inputs
                .string("method")?
                .parse()
                .map_err(|e: genui_tools::ToolsError| NodeError::invalid("method", e.to_string()))?,
            headers: inputs.string("headers")?.to_string(),
        };
        tracing::debug!(tool = %config.name, method = %config.method, "Created API tool");
        let tool = HttpTool::with_timeout(config, self.ctx.config.tool_timeout);
        Ok(NodeOutput::value(ToolInput::single(tool)))
    }
}

/// `ReadTextFileTool`: hands the model one file from the input directory
pub struct ReadTextFileToolNode {
    ctx: NodeContext,
}

impl ReadTextFileToolNode {
    pub const fn new(ctx: NodeContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Node for ReadTextFileToolNode {
    fn name(&self) -> &'static str {
        "ReadTextFileTool"
    }

    async fn descriptor(&self) -> NodeDescriptor {
        let files = list_input_files(&self.ctx.config.input_dir)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(dir = %self.ctx.config.input_dir.display(), error = %e, "Cannot list input files");
                Vec::new()
            });
        let default = files.first().cloned();

        NodeDescriptor {
            name: self.name(),
            display_name: "Read Text File Tool (GenUI)",
            category: CATEGORY,
            description: "Creates a tool that reads the selected text file.",
            inputs: vec![InputSpec::required(
                "file",
                InputKind::Choice {
                    options: files,
                    default,
                },
            )],
            outputs: vec![OutputSpec::tool("tool")],
            output_node: false,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let tool = ReadTextFileTool::new(&self.ctx.config.input_dir, inputs.string("file")?);
        Ok(NodeOutput::value(ToolInput::single(tool)))
    }
}

const COLLECTION_PORTS: [&str; 5] = ["tool_1", "tool_2", "tool_3", "tool_4", "tool_5"];

/// `ToolCollection`: bundles up to five tool ports into one
pub struct ToolCollectionNode;

#[async_trait]
impl Node for ToolCollectionNode {
    fn name(&self) -> &'static str {
        "ToolCollection"
    }

    async fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: self.name(),
            display_name: "Tool Collection (GenUI)",
            category: CATEGORY,
            description: "Bundles several tools into one input for the agent.",
            inputs: COLLECTION_PORTS.into_iter().map(InputSpec::tool).collect(),
            outputs: vec![OutputSpec::tool("tool_collection")],
            output_node: false,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let collection = ToolInput::collect(COLLECTION_PORTS.iter().map(|port| inputs.tool(port)));
        if collection.tools().is_empty() {
            tracing::debug!("Tool collection is empty");
        }
        Ok(NodeOutput::value(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::port::NodeValue;
    use crate::testing::{ScriptedFactory, ScriptedProvider, context, temp_dir};
    use genui_core::{ToolArgs, ToolCatalog, ToolCall};

    fn tool_output(output: &NodeOutput) -> Result<ToolInput> {
        match output.first() {
            Some(NodeValue::Tool(tool)) => Ok(tool.clone()),
            _ => Err(NodeError::invalid("tool", "node output is not a tool")),
        }
    }

    fn ctx(config: NodeConfig) -> NodeContext {
        context(config, ScriptedFactory::new(ScriptedProvider::new([])))
    }

    async fn run(node: &dyn Node, inputs: NodeInputs) -> Result<NodeOutput> {
        let inputs = node.descriptor().await.validate(inputs)?;
        node.execute(inputs).await
    }

    #[tokio::test]
    async fn test_api_tool_node_builds_tool() {
        let node = ApiToolNode::new(ctx(NodeConfig::default()));
        let output = run(&node, NodeInputs::new().with("method", "POST")).await.unwrap();

        let tool = tool_output(&output).unwrap();
        let tools = tool.tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "get_weather");
        assert_eq!(
            tools[0].description(),
            "Get current weather for a location. Params: location (str)"
        );
    }

    #[tokio::test]
    async fn test_api_tool_rejects_unknown_method() {
        let node = ApiToolNode::new(ctx(NodeConfig::default()));
        let err = run(&node, NodeInputs::new().with("method", "PATCH")).await.unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_malformed_headers_surface_through_dispatch() {
        let node = ApiToolNode::new(ctx(NodeConfig::default()));
        let inputs = NodeInputs::new()
            .with("url", "http://127.0.0.1:9/weather")
            .with("headers", "{oops");
        let tool = tool_output(&run(&node, inputs).await.unwrap()).unwrap();

        let catalog = ToolCatalog::build([Some(tool)]);
        let result = catalog
            .dispatch(&ToolCall::new("c1", "get_weather", r#"{"location": "Seattle"}"#))
            .await;
        assert!(result.output.starts_with("Error executing tool get_weather: "));
    }

    #[tokio::test]
    async fn test_read_file_node_lists_and_reads() {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("b.md"), "# notes").await.unwrap();
        tokio::fs::write(dir.join("a.csv"), "x,y").await.unwrap();
        tokio::fs::write(dir.join("skip.bin"), "zz").await.unwrap();

        let node = ReadTextFileToolNode::new(ctx(NodeConfig {
            input_dir: dir.clone(),
            ..NodeConfig::default()
        }));

        let descriptor = node.descriptor().await;
        let file = serde_json::to_value(descriptor.input("file").unwrap()).unwrap();
        assert_eq!(file["options"], serde_json::json!(["a.csv", "b.md"]));
        assert_eq!(file["default"], "a.csv");

        let output = run(&node, NodeInputs::new().with("file", "b.md")).await.unwrap();
        let tool = tool_output(&output).unwrap();
        let read = &tool.tools()[0];
        assert_eq!(read.name(), "read_text_file");
        assert_eq!(read.description(), "Reads the content of the selected file: b.md");
        assert_eq!(read.call(ToolArgs::new()).await.unwrap(), "# notes");

        let err = run(&node, NodeInputs::new().with("file", "skip.bin")).await.unwrap_err();
        assert!(err.is_input_error());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_input_dir_requires_file() {
        let node = ReadTextFileToolNode::new(ctx(NodeConfig {
            input_dir: temp_dir(),
            ..NodeConfig::default()
        }));
        let err = run(&node, NodeInputs::new()).await.unwrap_err();
        assert!(matches!(err, NodeError::MissingInput(name) if name == "file"));
    }

    #[tokio::test]
    async fn test_collection_flattens_and_skips_absent() {
        let api = ApiToolNode::new(ctx(NodeConfig::default()));
        let weather = tool_output(&run(&api, NodeInputs::new()).await.unwrap()).unwrap();
        let search = tool_output(&run(&api, NodeInputs::new().with("name", "search")).await.unwrap()).unwrap();

        let inner = tool_output(
            &run(
                &ToolCollectionNode,
                NodeInputs::new().with("tool_1", weather.clone()).with("tool_2", search),
            )
            .await
            .unwrap(),
        )
        .unwrap();

        let outer = tool_output(
            &run(
                &ToolCollectionNode,
                NodeInputs::new().with("tool_2", inner).with("tool_5", weather),
            )
            .await
            .unwrap(),
        )
        .unwrap();

        let names: Vec<&str> = outer.tools().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["get_weather", "search", "get_weather"]);

        let catalog = ToolCatalog::build([Some(outer)]);
        assert_eq!(catalog.names(), vec!["get_weather", "search"]);
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let output = run(&ToolCollectionNode, NodeInputs::new()).await.unwrap();
        assert!(tool_output(&output).unwrap().tools().is_empty());
    }
}
