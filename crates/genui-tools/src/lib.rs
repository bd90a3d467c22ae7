//! # genui-tools
//!
//! Tools an orchestrator agent can be handed from the node graph.
//!
//! ## Tools
//!
//! - **`HttpTool`**: one REST call per invocation, arguments as query or JSON body
//! - **`ReadTextFileTool`**: contents of a file chosen from the input directory
//!
//! Both report failures as result text so a run keeps going.

pub mod error;
pub mod file;
pub mod http;

pub use error::{Result, ToolsError};
pub use file::{READ_TEXT_FILE, ReadTextFileTool, TEXT_EXTENSIONS, list_input_files};
pub use http::{HttpMethod, HttpTool, HttpToolConfig};
