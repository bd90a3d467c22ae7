//! OpenAI LLM Provider
//!
//! Implementation of `LlmProvider` over the chat completions API. History and
//! tool schemas are passed through nearly verbatim; tool calling runs with
//! `tool_choice: "auto"` whenever tools are supplied.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use genui_core::{
    error::{AgentError, Result},
    message::{Content, Message, Role},
    provider::{GenerationOptions, LlmProvider, ProviderReply},
    tool::{ToolCall, ToolSchema},
};

use crate::ProviderConfig;

/// OpenAI LLM provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiProvider {
    /// Create a provider against the configured endpoint
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            api_key: api_key.into(),
            endpoint: config.openai_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convert agent messages to chat completion messages, system first
    fn convert_messages(system_instruction: &str, messages: &[Message]) -> Vec<ChatMessage> {
        let mut converted = Vec::with_capacity(messages.len() + 1);
        if !system_instruction.is_empty() {
            converted.push(ChatMessage {
                role: "system",
                content: Some(Content::Text(system_instruction.to_string())),
                tool_calls: None,
                tool_call_id: None,
                name: None,
            });
        }

        converted.extend(messages.iter().map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            };
            let tool_calls = (!m.tool_calls.is_empty()).then(|| {
                m.tool_calls
                    .iter()
                    .map(|c| ChatToolCall {
                        id: Some(c.id.clone()),
                        kind: Some("function".into()),
                        function: ChatFunctionCall {
                            name: c.name.clone(),
                            arguments: Some(c.arguments.clone()),
                        },
                    })
                    .collect()
            });
            // Assistant turns that only carry tool calls send null content
            let content = if tool_calls.is_some() && m.content.is_empty() {
                None
            } else {
                Some(m.content.clone())
            };
            ChatMessage {
                role,
                content,
                tool_calls,
                tool_call_id: m.tool_call_id.clone(),
                name: m.name.clone(),
            }
        }));
        converted
    }

    fn build_request<'a>(
        messages: &[Message],
        tools: &'a [ToolSchema],
        options: &GenerationOptions,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: options.model.clone(),
            messages: Self::convert_messages(&options.system_instruction, messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            tool_choice: (!tools.is_empty()).then_some("auto"),
            tools,
        }
    }

    /// Normalize the first choice into a reply
    fn convert_reply(response: ChatResponse) -> Result<ProviderReply> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("OpenAI returned no choices".into()))?;

        let calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|c| {
                let id = c
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
                let arguments = c.function.arguments.unwrap_or_else(|| "{}".into());
                ToolCall::new(id, c.function.name, arguments)
            })
            .collect();

        Ok(ProviderReply::from_parts(choice.message.content, calls))
    }
}

// Chat completions request/response structures

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolSchema],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_tools(tools: &&[ToolSchema]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    function: ChatFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<ProviderReply> {
        let body = Self::build_request(messages, tools, options);
        tracing::debug!(
            model = %options.model,
            messages = body.messages.len(),
            tools = tools.len(),
            "Calling OpenAI"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        if !status.is_success() {
            return Err(AgentError::ProviderStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| AgentError::Provider(e.to_string()))?;
        Self::convert_reply(parsed)
    }
}
