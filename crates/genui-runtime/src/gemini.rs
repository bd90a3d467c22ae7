//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` over the Gemini `generateContent` REST
//! endpoint.
//!
//! Only text travels: image parts are skipped and tool schemas are not
//! translated, so Gemini replies are always final text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use genui_core::{
    error::{AgentError, Result},
    message::{ContentPart, Message, Role},
    provider::{GenerationOptions, LlmProvider, ProviderReply},
    tool::ToolSchema,
};

use crate::ProviderConfig;

/// Gemini LLM provider
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiProvider {
    /// Create a provider against the configured endpoint
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            api_key: api_key.into(),
            endpoint: config.gemini_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }

    /// Convert agent messages to Gemini contents
    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant | Role::Tool => "model",
                };
                let parts = text_parts(m);
                if parts.is_empty() {
                    tracing::debug!(role = %m.role, "Skipping message without text for Gemini");
                    return None;
                }
                Some(GeminiContent {
                    role: role.into(),
                    parts,
                })
            })
            .collect()
    }

    fn build_request(messages: &[Message], options: &GenerationOptions) -> GeminiRequest {
        let system_instruction = (!options.system_instruction.is_empty()).then(|| GeminiSystemInstruction {
            parts: vec![GeminiPart {
                text: options.system_instruction.clone(),
            }],
        });

        GeminiRequest {
            contents: Self::convert_messages(messages),
            system_instruction,
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            },
        }
    }

    /// Concatenate the text parts of the first candidate
    fn convert_reply(response: GeminiResponse) -> Result<ProviderReply> {
        if let Some(error) = response.error {
            return Err(AgentError::Provider(format!("Gemini API error: {}", error.message)));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("Gemini returned no candidates".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(ProviderReply::FinalText(text))
    }
}

fn text_parts(message: &Message) -> Vec<GeminiPart> {
    match &message.content {
        genui_core::Content::Text(text) if text.is_empty() => Vec::new(),
        genui_core::Content::Text(text) => vec![GeminiPart { text: text.clone() }],
        genui_core::Content::Parts(parts) => parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(GeminiPart { text: text.clone() }),
                ContentPart::ImageUrl { .. } => {
                    tracing::debug!("Image parts are not sent to Gemini");
                    None
                }
            })
            .collect(),
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<ProviderReply> {
        if !tools.is_empty() {
            tracing::debug!(tools = tools.len(), "Gemini adapter does not forward tool schemas");
        }

        let body = Self::build_request(messages, options);
        tracing::debug!(model = %options.model, contents = body.contents.len(), "Calling Gemini");

        let response = self
            .client
            .post(self.url(&options.model))
            .header("x-goog-api-key", &self.api_key)
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

        let parsed: GeminiResponse =
            serde_json::from_str(&text).map_err(|e| AgentError::Provider(e.to_string()))?;
        Self::convert_reply(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::HeaderMap,
        routing::post,
    };
    use genui_core::{ToolCall, tool::open_parameters};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(String, String, Value)>>>;

    async fn serve(reply: Value, status: u16) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route(
                "/v1beta/models/{action}",
                post(
                    move |State(seen): State<Seen>,
                          Path(action): Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let key = headers
                                .get("x-goog-api-key")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default()
                                .to_string();
                            seen.lock().unwrap().push((action, key, body));
                            (
                                axum::http::StatusCode::from_u16(status).unwrap(),
                                Json(reply),
                            )
                        }
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}/v1beta"), seen)
    }

    fn provider(base: &str) -> GeminiProvider {
        let config = ProviderConfig {
            gemini_base_url: base.into(),
            ..ProviderConfig::default()
        };
        GeminiProvider::new("g-key", &config).unwrap()
    }

    #[test]
    fn test_role_mapping() {
        let messages = vec![
            Message::user("Hello"),
            Message::assistant_tool_calls(String::new(), vec![ToolCall::new("1", "t", "{}")]),
            Message::tool("1", "t", "result"),
            Message::assistant("Hi"),
        ];

        let converted = GeminiProvider::convert_messages(&messages);
        let roles: Vec<&str> = converted.iter().map(|c| c.role.as_str()).collect();
        // The empty assistant tool request carries no text and is dropped
        assert_eq!(roles, vec!["user", "model", "model"]);
        assert_eq!(converted[1].parts[0].text, "result");
    }

    #[test]
    fn test_request_shape() {
        let options = GenerationOptions {
            model: "gemini-2.5-flash".into(),
            temperature: 0.2,
            max_tokens: 512,
            system_instruction: "Be brief.".into(),
        };
        let body = serde_json::to_value(GeminiProvider::build_request(&[Message::user("Hi")], &options)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hi");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
        assert!(body.get("tools").is_none());

        let no_system = GenerationOptions::default();
        let body = serde_json::to_value(GeminiProvider::build_request(&[Message::user("Hi")], &no_system)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[tokio::test]
    async fn test_generate_returns_joined_text() {
        let (base, seen) = serve(
            json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "It is "}, {"text": "sunny."}]}}]}),
            200,
        )
        .await;

        let tools = vec![ToolSchema::function("get_weather", "weather", open_parameters())];
        let reply = provider(&base)
            .generate(
                &[Message::user("Weather?")],
                &tools,
                &GenerationOptions {
                    model: "gemini-2.5-pro".into(),
                    ..GenerationOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(reply, ProviderReply::FinalText("It is sunny.".into()));
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "gemini-2.5-pro:generateContent");
        assert_eq!(seen[0].1, "g-key");
        assert!(seen[0].2.get("tools").is_none());
    }

    #[tokio::test]
    async fn test_generate_surfaces_http_errors() {
        let (base, _) = serve(json!({"error": {"message": "API key not valid"}}), 400).await;

        let err = provider(&base)
            .generate(&[Message::user("Hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ProviderStatus { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_generate_without_candidates_fails() {
        let (base, _) = serve(json!({"promptFeedback": {"blockReason": "SAFETY"}}), 200).await;

        let err = provider(&base)
            .generate(&[Message::user("Hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Provider(_)));
    }
}
