//! Scripted providers shared by node tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use genui_core::{
    AgentError, GenerationOptions, LlmProvider, Message, ProviderFactory, ProviderKind, ProviderReply,
    Result, ToolSchema,
};

use crate::config::{EnvLookup, NodeConfig, NodeContext};

type Step = std::result::Result<ProviderReply, String>;

/// Replays a fixed script and records what it was sent
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    pub calls: AtomicUsize,
    pub seen_options: Mutex<Vec<GenerationOptions>>,
    pub seen_tools: Mutex<Vec<usize>>,
    pub seen_messages: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<ProviderReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_messages.lock().unwrap().push(messages.to_vec());
        self.seen_tools.lock().unwrap().push(tools.len());
        self.seen_options.lock().unwrap().push(options.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(AgentError::Provider(reason)),
            None => Err(AgentError::Provider("script exhausted".into())),
        }
    }
}

/// Hands out one scripted provider and records the requests
pub struct ScriptedFactory {
    pub provider: Arc<ScriptedProvider>,
    pub created: Mutex<Vec<(ProviderKind, String)>>,
}

impl ScriptedFactory {
    pub fn new(provider: Arc<ScriptedProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            created: Mutex::new(Vec::new()),
        })
    }
}

impl ProviderFactory for ScriptedFactory {
    fn create(&self, kind: ProviderKind, api_key: String) -> Result<Arc<dyn LlmProvider>> {
        self.created.lock().unwrap().push((kind, api_key));
        Ok(self.provider.clone())
    }
}

pub fn no_env() -> EnvLookup {
    Arc::new(|_: &str| -> Option<String> { None })
}

pub fn context(config: NodeConfig, factory: Arc<ScriptedFactory>) -> NodeContext {
    NodeContext::new(config, factory).with_env(no_env())
}

pub fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("genui-nodes-{}", uuid::Uuid::new_v4()))
}
