//! Text I/O Nodes

use async_trait::async_trait;

use crate::error::Result;
use crate::node::Node;
use crate::port::{InputSpec, NodeDescriptor, NodeInputs, NodeOutput, OutputSpec, UiPayload};

/// `UserTextInput`: passes typed text downstream
pub struct UserTextInput;

#[async_trait]
impl Node for UserTextInput {
    fn name(&self) -> &'static str {
        "UserTextInput"
    }

    async fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: self.name(),
            display_name: "User Text Input (GenUI)",
            category: "GenUI",
            description: "Takes text from the user and outputs it.",
            inputs: vec![InputSpec::text("text", "")],
            outputs: vec![OutputSpec::string("text")],
            output_node: false,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        Ok(NodeOutput::value(inputs.string("text")?))
    }
}

/// `TextOutput`: shows upstream text in the UI
pub struct TextOutput;

#[async_trait]
impl Node for TextOutput {
    fn name(&self) -> &'static str {
        "TextOutput"
    }

    async fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: self.name(),
            display_name: "Text Output (GenUI)",
            category: "GenUI",
            description: "Read-only display of the incoming text.",
            inputs: vec![InputSpec::forced_text("text")],
            outputs: Vec::new(),
            output_node: true,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        Ok(NodeOutput::ui(UiPayload {
            text: vec![inputs.string("text")?.to_string()],
            ui_render_url: None,
        }))
    }
}
