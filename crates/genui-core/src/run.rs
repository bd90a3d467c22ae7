//! Orchestration Run State
//!
//! State owned by a single orchestration run. Created when the agent starts,
//! mutated turn by turn, and turned into a [`RunReport`] at the end. Nothing
//! here outlives the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Conversation, Message};
use crate::tool::{ToolCall, ToolResult};

/// Output when the provider call fails
pub const LLM_CALL_ERROR: &str = "Error during LLM call.";

/// Unique run identifier, used to correlate log lines
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a run ended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The model produced a final answer
    Completed { text: String },
    /// The provider call failed; the run stopped without retrying
    ProviderFailed { reason: String },
    /// Every turn requested more tools
    TurnBudgetExhausted { max_turns: usize },
}

impl RunOutcome {
    /// Text handed to the host output port
    pub fn output(&self) -> String {
        match self {
            Self::Completed { text } => text.clone(),
            Self::ProviderFailed { .. } => LLM_CALL_ERROR.to_string(),
            Self::TurnBudgetExhausted { max_turns } => {
                format!("Error: Agent stopped after {max_turns} turns without a final answer.")
            }
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Mutable state of one run
#[derive(Debug)]
pub struct OrchestrationRun {
    id: RunId,
    goal: String,
    conversation: Conversation,
    turn: usize,
    max_turns: usize,
    tool_invocations: usize,
    started_at: DateTime<Utc>,
}

impl OrchestrationRun {
    /// Start a run: the conversation opens with the goal as a user message
    pub fn new(goal: impl Into<String>, max_turns: usize) -> Self {
        let goal = goal.into();
        Self {
            id: RunId::new(),
            conversation: Conversation::with_goal(goal.as_str()),
            goal,
            turn: 0,
            max_turns,
            tool_invocations: 0,
            started_at: Utc::now(),
        }
    }

    pub const fn id(&self) -> &RunId {
        &self.id
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub const fn turn(&self) -> usize {
        self.turn
    }

    pub const fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Advance to the next turn. Returns `false` once the budget is spent;
    /// the counter never passes `max_turns`.
    pub fn begin_turn(&mut self) -> bool {
        if self.turn >= self.max_turns {
            return false;
        }
        self.turn += 1;
        true
    }

    /// Record the assistant turn that requested `calls`
    pub fn push_tool_request(&mut self, text: &str, calls: Vec<ToolCall>) {
        self.conversation.push(Message::assistant_tool_calls(text, calls));
    }

    /// Record the result of one dispatched call
    pub fn push_tool_result(&mut self, result: ToolResult) {
        self.tool_invocations += 1;
        self.conversation
            .push(Message::tool(result.id, result.name, result.output));
    }

    /// Record the final assistant text
    pub fn push_final(&mut self, text: &str) {
        self.conversation.push(Message::assistant(text));
    }

    /// Close the run
    pub fn finish(self, outcome: RunOutcome) -> RunReport {
        RunReport {
            id: self.id,
            output: outcome.output(),
            outcome,
            turns: self.turn,
            tool_invocations: self.tool_invocations,
            conversation: self.conversation,
            duration: Utc::now() - self.started_at,
        }
    }
}

/// Summary of a finished run
#[derive(Clone, Debug)]
pub struct RunReport {
    pub id: RunId,
    /// Final output string
    pub output: String,
    pub outcome: RunOutcome,
    /// Provider calls made
    pub turns: usize,
    /// Tool calls dispatched
    pub tool_invocations: usize,
    pub conversation: Conversation,
    pub duration: chrono::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_starts_with_goal() {
        let run = OrchestrationRun::new("Check the weather", 10);
        assert_eq!(run.turn(), 0);
        assert_eq!(run.messages().len(), 1);
        assert_eq!(run.messages()[0].text(), "Check the weather");
    }

    #[test]
    fn test_turn_counter_is_bounded() {
        let mut run = OrchestrationRun::new("goal", 3);
        let mut started = 0;
        while run.begin_turn() {
            started += 1;
        }
        assert_eq!(started, 3);
        assert_eq!(run.turn(), 3);
        assert!(!run.begin_turn());
        assert_eq!(run.turn(), 3);
    }

    #[test]
    fn test_outcome_output() {
        assert_eq!(
            RunOutcome::Completed { text: "done".into() }.output(),
            "done"
        );
        assert_eq!(
            RunOutcome::ProviderFailed { reason: "timeout".into() }.output(),
            "Error during LLM call."
        );
        assert_eq!(
            RunOutcome::TurnBudgetExhausted { max_turns: 10 }.output(),
            "Error: Agent stopped after 10 turns without a final answer."
        );
    }

    #[test]
    fn test_finish_counts_tool_results() {
        let mut run = OrchestrationRun::new("goal", 10);
        assert!(run.begin_turn());
        let call = ToolCall::new("c1", "t", "{}");
        run.push_tool_request("", vec![call.clone()]);
        run.push_tool_result(ToolResult::success(&call, "ok"));

        let report = run.finish(RunOutcome::Completed { text: "fin".into() });
        assert_eq!(report.turns, 1);
        assert_eq!(report.tool_invocations, 1);
        assert_eq!(report.conversation.len(), 3);
        assert!(report.conversation.tool_results_are_paired());
    }
}
