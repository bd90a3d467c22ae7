//! Tool System
//!
//! Tools are named, schema-described callables the model may request.
//! A [`ToolCatalog`] merges the tools wired into one run, deduplicated by
//! name, and dispatches model-issued calls to them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result, ToolError};

/// Keyword arguments passed to a tool
pub type ToolArgs = Map<String, Value>;

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID, echoed back in the tool result message
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Arguments as the model produced them: JSON text
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Decode the argument text into keyword arguments.
    ///
    /// Blank text and `null` mean "no arguments"; any other non-object JSON
    /// is rejected.
    pub fn parse_arguments(&self) -> std::result::Result<ToolArgs, ToolError> {
        let raw = self.arguments.trim();
        if raw.is_empty() {
            return Ok(ToolArgs::new());
        }

        match serde_json::from_str::<Value>(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(ToolArgs::new()),
            other => Err(ToolError::InvalidArguments(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID from the request
    pub id: String,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (result text or error text)
    pub output: String,
}

impl ToolResult {
    pub fn success(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            name: call.name.clone(),
            id: call.id.clone(),
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(call: &ToolCall, error: impl Into<String>) -> Self {
        Self {
            name: call.name.clone(),
            id: call.id.clone(),
            success: false,
            output: error.into(),
        }
    }
}

/// Function description inside a [`ToolSchema`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema object
    pub parameters: Value,
}

/// Provider-facing tool schema: `{type: "function", function: {...}}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSchema,
}

impl ToolSchema {
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: "function".into(),
            function: FunctionSchema {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Parameter schema that accepts any keyword arguments
pub fn open_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "additionalProperties": true
    })
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model calls the tool by
    fn name(&self) -> &str;

    /// Human-readable description (shown to the LLM)
    fn description(&self) -> &str;

    /// JSON Schema of the keyword arguments
    fn parameters(&self) -> Value {
        open_parameters()
    }

    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema {
        ToolSchema::function(self.name(), self.description(), self.parameters())
    }

    /// Execute the tool with keyword arguments
    async fn call(&self, args: ToolArgs) -> std::result::Result<String, ToolError>;
}

/// Shared handle to a tool definition
pub type ToolRef = Arc<dyn Tool>;

/// Value carried on a tool port: one definition or a flat collection
#[derive(Clone)]
pub enum ToolInput {
    Single(ToolRef),
    Collection(Vec<ToolRef>),
}

impl ToolInput {
    pub fn single<T: Tool + 'static>(tool: T) -> Self {
        Self::Single(Arc::new(tool))
    }

    /// Merge optional tool inputs into one collection, flattening collections
    /// one level and skipping absent inputs.
    pub fn collect<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = Option<Self>>,
    {
        let mut tools = Vec::new();
        for input in inputs.into_iter().flatten() {
            tools.extend(input.into_tools());
        }
        Self::Collection(tools)
    }

    /// Tools in input order
    pub fn tools(&self) -> &[ToolRef] {
        match self {
            Self::Single(tool) => std::slice::from_ref(tool),
            Self::Collection(tools) => tools,
        }
    }

    pub fn into_tools(self) -> Vec<ToolRef> {
        match self {
            Self::Single(tool) => vec![tool],
            Self::Collection(tools) => tools,
        }
    }
}

impl std::fmt::Debug for ToolInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.tools().iter().map(|t| t.name()).collect();
        match self {
            Self::Single(_) => f.debug_tuple("Single").field(&names[0]).finish(),
            Self::Collection(_) => f.debug_tuple("Collection").field(&names).finish(),
        }
    }
}

/// Deduplicated set of tools available to one run.
///
/// A name keeps the position of its first appearance; a later definition with
/// the same name replaces the earlier one.
#[derive(Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolRef>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the values of zero or more tool ports
    pub fn build<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = Option<ToolInput>>,
    {
        let mut catalog = Self::new();
        for input in inputs.into_iter().flatten() {
            for tool in input.into_tools() {
                catalog.insert(tool);
            }
        }
        catalog
    }

    /// Register a tool, replacing any tool with the same name
    pub fn insert(&mut self, tool: ToolRef) {
        let name = tool.name().to_string();
        if let Some(&pos) = self.index.get(&name) {
            tracing::debug!(tool = %name, "Replacing duplicate tool definition");
            self.tools[pos] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Register a tool by value
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.insert(Arc::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<ToolRef> {
        self.index.get(name).map(|&pos| Arc::clone(&self.tools[pos]))
    }

    /// Tool names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Schemas in catalog order, ready for a provider request
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Number of tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name
    pub async fn invoke(&self, name: &str, args: ToolArgs) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        Ok(tool.call(args).await?)
    }

    /// Execute a model-issued call. Never fails: lookup, argument and
    /// execution errors come back as the result text.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.get(&call.name) else {
            return ToolResult::failure(call, format!("Error: Tool {} not found.", call.name));
        };

        let outcome = match call.parse_arguments() {
            Ok(args) => tool.call(args).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(output) => ToolResult::success(call, output),
            Err(e) => {
                tracing::debug!(tool = %call.name, error = %e, "Tool call failed");
                ToolResult::failure(call, format!("Error executing {}: {}", call.name, e))
            }
        }
    }
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("tools", &self.names())
            .finish()
    }
}
