//! UI Render Node
//!
//! Saves HTML/CSS under `{output}/ui_previews` and reports a `/view` link
//! the host can open as a preview.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::config::NodeContext;
use crate::error::{NodeError, Result};
use crate::node::Node;
use crate::port::{InputSpec, NodeDescriptor, NodeInputs, NodeOutput, UiPayload};

pub const UI_PREVIEW_DIR: &str = "ui_previews";

const DEFAULT_PREFIX: &str = "ComfyUI_UI";
const DEFAULT_CODE: &str = "<style>.ui-card { padding: 16px; background:#111; color:#fff; }</style><div class='ui-card'>Hello ComfyUI</div>";

/// Wrap a fragment into a standalone document unless it already is one
pub fn wrap_html(code: &str) -> String {
    if code.to_lowercase().contains("<html") {
        return code.to_string();
    }
    format!("<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{code}</body></html>")
}

/// Where a prefix lands: subfolder segments and the file stem
#[derive(Debug, PartialEq, Eq)]
struct SaveTarget {
    subfolder: Vec<String>,
    stem: String,
}

fn parse_prefix(prefix: &str) -> Result<SaveTarget> {
    let trimmed = prefix.trim();
    let trimmed = if trimmed.is_empty() { DEFAULT_PREFIX } else { trimmed };
    let clean = trimmed.replace('\\', "/");

    if clean.split('/').any(|segment| segment == "..") {
        return Err(NodeError::InvalidPrefix(prefix.to_string()));
    }

    let mut segments: Vec<String> = clean
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(ToString::to_string)
        .collect();
    let stem = segments.pop().unwrap_or_else(|| DEFAULT_PREFIX.to_string());
    Ok(SaveTarget {
        subfolder: segments,
        stem,
    })
}

/// Next free counter for `stem` in `folder`: one past the highest
/// `{stem}_{counter}_…` already present
async fn next_counter(folder: &Path, stem: &str) -> Result<u64> {
    let mut highest = None;
    let mut entries = tokio::fs::read_dir(folder).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(rest) = name.to_str().and_then(|n| n.strip_prefix(stem)) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix('_') else {
            continue;
        };
        let digits = rest.split('_').next().unwrap_or_default();
        let counter = digits.parse::<u64>().unwrap_or(0);
        highest = Some(highest.map_or(counter, |h: u64| h.max(counter)));
    }
    match highest {
        None => Ok(1),
        Some(h) => h.checked_add(1).ok_or_else(|| NodeError::CounterExhausted(stem.to_string())),
    }
}

/// Create `{stem}_{counter:05}_.html` without touching existing files.
/// A name taken by a concurrent render moves on to the next counter.
async fn save_unique(folder: &Path, stem: &str, html: &str) -> Result<String> {
    let mut counter = next_counter(folder, stem).await?;
    loop {
        let filename = format!("{stem}_{counter:05}_.html");
        let opened = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(folder.join(&filename))
            .await;
        match opened {
            Ok(mut file) => {
                file.write_all(html.as_bytes()).await?;
                file.flush().await?;
                return Ok(filename);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::debug!(file = %filename, "Preview name taken, trying next counter");
                counter = counter
                    .checked_add(1)
                    .ok_or_else(|| NodeError::CounterExhausted(stem.to_string()))?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Percent-encode a query value, keeping unreserved characters and `/`
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(char::from(b));
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// `/view` link for a saved file; empty values are left out
pub fn preview_url(filename: &str, subfolder: &str, timestamp: &str) -> String {
    let query = [
        ("filename", filename),
        ("subfolder", subfolder),
        ("type", "output"),
        ("allow_html", "1"),
        ("t", timestamp),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(key, value)| format!("{key}={}", quote(value)))
    .collect::<Vec<_>>()
    .join("&");
    format!("/view?{query}")
}

fn cache_buster() -> String {
    let now = chrono::Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

/// `UIRender`: writes the HTML and links a preview
pub struct UiRenderNode {
    ctx: NodeContext,
}

impl UiRenderNode {
    pub const fn new(ctx: NodeContext) -> Self {
        Self { ctx }
    }

    fn folder(&self, target: &SaveTarget) -> PathBuf {
        let mut folder = self.ctx.config.output_dir.join(UI_PREVIEW_DIR);
        folder.extend(&target.subfolder);
        folder
    }
}

#[async_trait]
impl Node for UiRenderNode {
    fn name(&self) -> &'static str {
        "UIRender"
    }

    async fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            name: self.name(),
            display_name: "UI Render (GenUI)",
            category: "GenUI",
            description: "Saves HTML/CSS UI code and links a /view preview.",
            inputs: vec![
                InputSpec::text("code", DEFAULT_CODE),
                InputSpec::string("filename_prefix", DEFAULT_PREFIX),
            ],
            outputs: Vec::new(),
            output_node: true,
        }
    }

    async fn execute(&self, inputs: NodeInputs) -> Result<NodeOutput> {
        let target = parse_prefix(inputs.string("filename_prefix")?)?;
        let folder = self.folder(&target);
        tokio::fs::create_dir_all(&folder).await?;

        let filename = save_unique(&folder, &target.stem, &wrap_html(inputs.string("code")?)).await?;

        let subfolder = std::iter::once(UI_PREVIEW_DIR.to_string())
            .chain(target.subfolder.iter().cloned())
            .collect::<Vec<_>>()
            .join("/");
        let relative = format!("{subfolder}/{filename}");
        let url = preview_url(&filename, &subfolder, &cache_buster());
        tracing::info!(path = %relative, "Saved UI HTML");

        Ok(NodeOutput::ui(UiPayload {
            text: vec![format!("Saved UI HTML: {relative}\nPreview: {url}")],
            ui_render_url: Some(url),
        }))
    }
}
