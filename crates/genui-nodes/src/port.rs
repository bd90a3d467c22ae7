//! Typed Ports
//!
//! Values flowing between nodes, the input specs a node declares, and the
//! validation the registry runs before any node executes.

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;

use genui_core::ToolInput;

use crate::error::{NodeError, Result};

/// A value on a node port
#[derive(Clone, Debug)]
pub enum NodeValue {
    String(String),
    Float(f64),
    Int(i64),
    Tool(ToolInput),
}

impl NodeValue {
    /// Convert a plain JSON input. Tool ports are resolved separately; `null`
    /// means the input is absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Float(f) => json!(f),
            Self::Int(i) => json!(i),
            Self::Tool(input) => {
                let names: Vec<&str> = input.tools().iter().map(|t| t.name()).collect();
                json!({ "tools": names })
            }
        }
    }

    const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "STRING",
            Self::Float(_) => "FLOAT",
            Self::Int(_) => "INT",
            Self::Tool(_) => "TOOL",
        }
    }
}

impl From<String> for NodeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for NodeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<ToolInput> for NodeValue {
    fn from(t: ToolInput) -> Self {
        Self::Tool(t)
    }
}

/// Named inputs for one node execution
#[derive(Clone, Debug, Default)]
pub struct NodeInputs {
    values: HashMap<String, NodeValue>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<NodeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<NodeValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&NodeValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(NodeValue::String(s)) => Ok(s),
            Some(other) => Err(NodeError::invalid(name, format!("expected STRING, got {}", other.type_name()))),
            None => Err(NodeError::MissingInput(name.into())),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        match self.get(name) {
            Some(NodeValue::Float(f)) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            Some(NodeValue::Int(i)) => Ok(*i as f64),
            Some(other) => Err(NodeError::invalid(name, format!("expected FLOAT, got {}", other.type_name()))),
            None => Err(NodeError::MissingInput(name.into())),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(NodeValue::Int(i)) => Ok(*i),
            Some(other) => Err(NodeError::invalid(name, format!("expected INT, got {}", other.type_name()))),
            None => Err(NodeError::MissingInput(name.into())),
        }
    }

    /// Tool port value; absent optional ports are `None`
    pub fn tool(&self, name: &str) -> Option<ToolInput> {
        match self.get(name) {
            Some(NodeValue::Tool(t)) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Data shown by the host next to the node
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UiPayload {
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_render_url: Option<String>,
}

/// Result of one node execution
#[derive(Clone, Debug, Default)]
pub struct NodeOutput {
    pub values: Vec<NodeValue>,
    pub ui: Option<UiPayload>,
}

impl NodeOutput {
    pub fn value(value: impl Into<NodeValue>) -> Self {
        Self {
            values: vec![value.into()],
            ui: None,
        }
    }

    pub fn ui(ui: UiPayload) -> Self {
        Self {
            values: Vec::new(),
            ui: Some(ui),
        }
    }

    pub fn first(&self) -> Option<&NodeValue> {
        self.values.first()
    }

    /// First output as text, if it is a string
    pub fn text(&self) -> Option<&str> {
        match self.first() {
            Some(NodeValue::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Kind and constraints of an input port
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum InputKind {
    String {
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        multiline: bool,
    },
    Float {
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    Int {
        default: i64,
        min: i64,
        max: i64,
    },
    Choice {
        options: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    Tool,
}

/// Declared input port
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: InputKind,
    pub optional: bool,
}

impl InputSpec {
    pub fn string(name: &'static str, default: &str) -> Self {
        Self::required(name, InputKind::String {
            default: Some(default.into()),
            multiline: false,
        })
    }

    pub fn text(name: &'static str, default: &str) -> Self {
        Self::required(name, InputKind::String {
            default: Some(default.into()),
            multiline: true,
        })
    }

    /// Text that must come from upstream
    pub fn forced_text(name: &'static str) -> Self {
        Self::required(name, InputKind::String {
            default: None,
            multiline: true,
        })
    }

    pub fn choice<I, S>(name: &'static str, options: I, default: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::required(name, InputKind::Choice {
            options: options.into_iter().map(Into::into).collect(),
            default: Some(default.into()),
        })
    }

    pub fn temperature() -> Self {
        Self::required("temperature", InputKind::Float {
            default: 0.7,
            min: 0.0,
            max: 2.0,
            step: 0.1,
        })
    }

    pub fn max_tokens() -> Self {
        Self::required("max_tokens", InputKind::Int {
            default: 8192,
            min: 1,
            max: 8192,
        })
    }

    pub const fn tool(name: &'static str) -> Self {
        Self {
            name,
            kind: InputKind::Tool,
            optional: true,
        }
    }

    pub const fn required(name: &'static str, kind: InputKind) -> Self {
        Self {
            name,
            kind,
            optional: false,
        }
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn default_value(&self) -> Option<NodeValue> {
        match &self.kind {
            InputKind::String { default, .. } | InputKind::Choice { default, .. } => {
                default.clone().map(NodeValue::String)
            }
            InputKind::Float { default, .. } => Some(NodeValue::Float(*default)),
            InputKind::Int { default, .. } => Some(NodeValue::Int(*default)),
            InputKind::Tool => None,
        }
    }

    /// Check one supplied value against this port, coercing numbers
    fn check(&self, value: NodeValue) -> Result<NodeValue> {
        let name = self.name;
        let mismatch = |v: &NodeValue, expected: &str| {
            NodeError::invalid(name, format!("expected {expected}, got {}", v.type_name()))
        };

        match (&self.kind, value) {
            (InputKind::String { .. }, v @ NodeValue::String(_)) | (InputKind::Tool, v @ NodeValue::Tool(_)) => Ok(v),
            (InputKind::Float { min, max, .. }, v) => {
                let f = match v {
                    NodeValue::Float(f) => f,
                    #[allow(clippy::cast_precision_loss)]
                    NodeValue::Int(i) => i as f64,
                    other => return Err(mismatch(&other, "FLOAT")),
                };
                if !f.is_finite() || f < *min || f > *max {
                    return Err(NodeError::invalid(name, format!("{f} is outside {min}..={max}")));
                }
                Ok(NodeValue::Float(f))
            }
            (InputKind::Int { min, max, .. }, v) => {
                let i = match v {
                    NodeValue::Int(i) => i,
                    #[allow(clippy::cast_possible_truncation)]
                    NodeValue::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
                    other => return Err(mismatch(&other, "INT")),
                };
                if i < *min || i > *max {
                    return Err(NodeError::invalid(name, format!("{i} is outside {min}..={max}")));
                }
                Ok(NodeValue::Int(i))
            }
            (InputKind::Choice { options, .. }, NodeValue::String(s)) => {
                if options.iter().any(|o| *o == s) {
                    Ok(NodeValue::String(s))
                } else {
                    Err(NodeError::invalid(name, format!("'{s}' is not one of {options:?}")))
                }
            }
            (InputKind::String { .. } | InputKind::Choice { .. }, other) => Err(mismatch(&other, "STRING")),
            (InputKind::Tool, other) => Err(mismatch(&other, "TOOL")),
        }
    }
}

/// Output port type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortType {
    String,
    Tool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: PortType,
}

impl OutputSpec {
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: PortType::String,
        }
    }

    pub const fn tool(name: &'static str) -> Self {
        Self {
            name,
            kind: PortType::Tool,
        }
    }
}

/// What the host needs to know to draw and wire a node
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    pub output_node: bool,
}

impl NodeDescriptor {
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| spec.name == name)
    }

    /// Validate supplied inputs: fill defaults, reject missing, mistyped and
    /// out-of-range values. Unknown inputs are dropped.
    pub fn validate(&self, mut supplied: NodeInputs) -> Result<NodeInputs> {
        let mut checked = NodeInputs::new();
        for spec in &self.inputs {
            match supplied.values.remove(spec.name) {
                Some(value) => checked.insert(spec.name, spec.check(value)?),
                None => match spec.default_value() {
                    Some(default) => checked.insert(spec.name, default),
                    None if spec.optional => {}
                    None => return Err(NodeError::MissingInput(spec.name.into())),
                },
            }
        }
        for extra in supplied.values.keys() {
            tracing::debug!(node = self.name, input = %extra, "Ignoring unknown input");
        }
        Ok(checked)
    }
}
