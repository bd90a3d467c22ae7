//! Reasoning Loop
//!
//! Bounded tool-calling loop: ask the provider, dispatch any requested tool
//! calls against the catalog, feed the results back, and repeat until the
//! model answers with text or the turn budget runs out.
//!
//! ```text
//! AWAIT_REPLY ──tool calls──▶ DISPATCH_TOOLS ──▶ AWAIT_REPLY
//!      │
//!      ├──text──────────────▶ DONE
//!      ├──provider error────▶ DONE("Error during LLM call.")
//!      └──budget spent──────▶ DONE(turn budget error)
//! ```

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::provider::{GenerationOptions, LlmProvider, ProviderReply};
use crate::run::{OrchestrationRun, RunOutcome, RunReport};
use crate::tool::{ToolCall, ToolCatalog};

/// Default turn budget
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Goal used when the user prompt is blank
pub const DEFAULT_GOAL: &str = "Please execute the available tools and provide a comprehensive report on the data or actions performed.";

/// Default system instruction for the agent node
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant. Use the provided tools to fulfill the user's implicit request or process the provided data. Summarize the findings clearly.";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum provider calls per run
    pub max_turns: usize,

    /// Generation options, system instruction included
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            generation: GenerationOptions {
                system_instruction: DEFAULT_SYSTEM_INSTRUCTION.into(),
                ..GenerationOptions::default()
            },
        }
    }
}

/// The orchestration agent
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolCatalog>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolCatalog>, config: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolCatalog>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Run the agent towards `goal`. Every run ends with a definite output.
    pub async fn run(&self, goal: &str) -> RunReport {
        let goal = if goal.trim().is_empty() { DEFAULT_GOAL } else { goal };
        let mut run = OrchestrationRun::new(goal, self.config.max_turns);
        let schemas = self.tools.schemas();

        tracing::info!(
            run = %run.id(),
            provider = self.provider.name(),
            model = %self.config.generation.model,
            tools = ?self.tools.names(),
            "Starting orchestration"
        );

        let outcome = loop {
            if !run.begin_turn() {
                tracing::warn!(run = %run.id(), max_turns = run.max_turns(), "Turn budget exhausted");
                break RunOutcome::TurnBudgetExhausted {
                    max_turns: run.max_turns(),
                };
            }

            let generated = self
                .provider
                .generate(run.messages(), &schemas, &self.config.generation)
                .await;
            let reply = match generated {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(run = %run.id(), turn = run.turn(), error = %e, "LLM call failed");
                    break RunOutcome::ProviderFailed {
                        reason: e.to_string(),
                    };
                }
            };

            match reply {
                ProviderReply::ToolCalls { text, calls } => {
                    tracing::debug!(run = %run.id(), turn = run.turn(), calls = calls.len(), "Dispatching tool calls");
                    self.dispatch_all(&mut run, &text, calls).await;
                }
                ProviderReply::FinalText(text) => {
                    run.push_final(&text);
                    break RunOutcome::Completed { text };
                }
            }
        };

        let report = run.finish(outcome);
        tracing::info!(
            run = %report.id,
            turns = report.turns,
            tool_invocations = report.tool_invocations,
            success = report.outcome.is_success(),
            "Orchestration finished"
        );
        report
    }

    /// Execute calls strictly in provider order, one tool message per call
    async fn dispatch_all(&self, run: &mut OrchestrationRun, text: &str, calls: Vec<ToolCall>) {
        run.push_tool_request(text, calls.clone());
        for call in &calls {
            tracing::debug!(run = %run.id(), tool = %call.name, id = %call.id, "Executing tool");
            let result = self.tools.dispatch(call).await;
            run.push_tool_result(result);
        }
    }

    /// Get the tool catalog
    pub fn tools(&self) -> &ToolCatalog {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolCatalog,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolCatalog::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolCatalog) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.generation.system_instruction = instruction.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub const fn max_tokens(mut self, max: u32) -> Self {
        self.config.generation.max_tokens = max;
        self
    }

    pub const fn max_turns(mut self, max: usize) -> Self {
        self.config.max_turns = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
