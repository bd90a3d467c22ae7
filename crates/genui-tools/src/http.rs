//! REST API Tool
//!
//! Calls a fixed URL with the model's keyword arguments: as query
//! parameters for GET, as a JSON body otherwise. The response body comes
//! back verbatim whatever the status code.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use genui_core::{Tool, ToolArgs, ToolError};

use crate::error::{Result, ToolsError};

/// HTTP methods an API tool may use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [Self; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    const fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ToolsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ToolsError::UnsupportedMethod(s.to_string()))
    }
}

/// Configuration of an API tool, as entered on the node
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpToolConfig {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// JSON object text; parsed on every invocation
    #[serde(default = "default_headers")]
    pub headers: String,
}

fn default_headers() -> String {
    "{}".into()
}

/// Tool that performs one HTTP request per invocation
pub struct HttpTool {
    config: HttpToolConfig,
    client: reqwest::Client,
}

impl HttpTool {
    pub fn new(config: HttpToolConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create with a request timeout
    pub fn with_timeout(config: HttpToolConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self::with_client(config, client)
    }

    pub const fn with_client(config: HttpToolConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub const fn config(&self) -> &HttpToolConfig {
        &self.config
    }

    fn parse_headers(&self) -> Result<HashMap<String, String>> {
        let raw = self.config.headers.trim();
        if raw.is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(raw).map_err(ToolsError::InvalidHeaders)
    }

    async fn request(&self, args: ToolArgs) -> Result<String> {
        let headers = self.parse_headers()?;

        let mut request = self
            .client
            .request(self.config.method.to_reqwest(), &self.config.url);
        for (key, value) in &headers {
            request = request.header(key.as_str(), value.as_str());
        }

        request = match self.config.method {
            HttpMethod::Get => request.query(&query_pairs(&args)),
            _ => request.json(&args),
        };

        tracing::debug!(
            tool = %self.config.name,
            method = %self.config.method,
            url = %self.config.url,
            "Calling API"
        );
        let response = request.send().await?;
        Ok(response.text().await?)
    }
}

/// Flatten keyword arguments into query pairs: strings verbatim, arrays as
/// repeated keys, nulls dropped, anything else as JSON text.
fn query_pairs(args: &ToolArgs) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(args.len());
    for (key, value) in args {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().filter_map(|v| query_value(v).map(|v| (key.clone(), v))));
            }
            other => {
                if let Some(v) = query_value(other) {
                    pairs.push((key.clone(), v));
                }
            }
        }
    }
    pairs
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl Tool for HttpTool {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    async fn call(&self, args: ToolArgs) -> std::result::Result<String, ToolError> {
        match self.request(args).await {
            Ok(body) => Ok(body),
            Err(e) => {
                tracing::warn!(tool = %self.config.name, error = %e, "API tool failed");
                Ok(format!("Error executing tool {}: {}", self.config.name, e))
            }
        }
    }
}
