//! Text File Tool
//!
//! Hands the model the contents of one file from the input directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use genui_core::{Tool, ToolArgs, ToolError};

use crate::error::Result;

/// Extensions offered as file choices
pub const TEXT_EXTENSIONS: [&str; 5] = ["txt", "json", "csv", "log", "md"];

pub const READ_TEXT_FILE: &str = "read_text_file";

/// Reads a file fixed at configuration time; call arguments are ignored
#[derive(Debug, Clone)]
pub struct ReadTextFileTool {
    path: PathBuf,
    description: String,
}

impl ReadTextFileTool {
    pub fn new(input_dir: impl AsRef<Path>, file: &str) -> Self {
        Self {
            path: input_dir.as_ref().join(file),
            description: format!("Reads the content of the selected file: {file}"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Tool for ReadTextFileTool {
    fn name(&self) -> &str {
        READ_TEXT_FILE
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, _args: ToolArgs) -> std::result::Result<String, ToolError> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(format!("Error: File not found at {}", self.path.display()));
        }

        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                tracing::debug!(path = %self.path.display(), bytes = text.len(), "Read text file");
                Ok(text)
            }
            Err(e) => Ok(format!("Error reading file: {e}")),
        }
    }
}

/// Case-sensitive suffix match: `notes.TXT` is not listed
fn is_text_file(name: &str) -> bool {
    TEXT_EXTENSIONS
        .iter()
        .any(|ext| name.strip_suffix(ext).is_some_and(|rest| rest.ends_with('.')))
}

/// Regular text files directly under `dir`, sorted by name
///
/// A missing directory lists as empty.
pub async fn list_input_files(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    if !tokio::fs::try_exists(dir).await? {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()).filter(|n| is_text_file(n)) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("genui-tools-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        dir
    }

    #[tokio::test]
    async fn test_reads_file_contents() {
        let dir = temp_dir().await;
        tokio::fs::write(dir.join("notes.txt"), "hello there").await.unwrap();

        let tool = ReadTextFileTool::new(&dir, "notes.txt");
        assert_eq!(tool.name(), "read_text_file");
        assert_eq!(tool.description(), "Reads the content of the selected file: notes.txt");
        assert_eq!(tool.call(ToolArgs::new()).await.unwrap(), "hello there");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = temp_dir().await;
        let tool = ReadTextFileTool::new(&dir, "gone.md");

        let out = tool.call(ToolArgs::new()).await.unwrap();
        assert_eq!(out, format!("Error: File not found at {}", dir.join("gone.md").display()));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_removed_after_configuration() {
        let dir = temp_dir().await;
        tokio::fs::write(dir.join("data.csv"), "a,b").await.unwrap();
        let tool = ReadTextFileTool::new(&dir, "data.csv");
        tokio::fs::remove_file(dir.join("data.csv")).await.unwrap();

        let out = tool.call(ToolArgs::new()).await.unwrap();
        assert!(out.starts_with("Error: File not found at "));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_utf8_is_a_read_error() {
        let dir = temp_dir().await;
        tokio::fs::write(dir.join("blob.log"), [0xff, 0xfe, 0x00]).await.unwrap();

        let out = ReadTextFileTool::new(&dir, "blob.log").call(ToolArgs::new()).await.unwrap();
        assert!(out.starts_with("Error reading file: "));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_input_files_filters_and_sorts() {
        let dir = temp_dir().await;
        for name in ["b.json", "a.txt", "image.png", "c.MD", "d.md", "notes.log", "NOTES.TXT", "archive.txt.gz"] {
            tokio::fs::write(dir.join(name), "x").await.unwrap();
        }
        tokio::fs::create_dir(dir.join("nested.txt")).await.unwrap();

        let files = list_input_files(&dir).await.unwrap();
        assert_eq!(files, vec!["a.txt", "b.json", "d.md", "notes.log"]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = std::env::temp_dir().join(format!("genui-missing-{}", uuid::Uuid::new_v4()));
        assert!(list_input_files(&dir).await.unwrap().is_empty());
    }
}
