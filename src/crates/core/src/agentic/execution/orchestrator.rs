//! Model/tool step loop
//!
//! Each step streams one model response to the writer. If the model asked for
//! tools they run one at a time, their results are appended to the
//! conversation and the next step starts. The loop ends when a step requests
//! no tools or the step budget is spent.

use super::stream_writer::StreamWriter;
use super::tool_calls::{AssembledToolCall, ToolCallAccumulator};
use crate::agentic::tools::ToolRegistry;
use crate::infrastructure::ai::{ModelProvider, ModelRequest};
use crate::util::errors::{CampusError, CampusResult};
use campus_ai_adapters::{ChatMessage, UnifiedTokenUsage};
use campus_core_types::FinishReason;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Provider-reported token counts summed over every step of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TurnUsage {
    pub fn add(&mut self, usage: &UnifiedTokenUsage) {
        self.prompt_tokens += usage.prompt_token_count;
        self.completion_tokens += usage.candidates_token_count;
        self.total_tokens += usage.total_token_count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub steps: u32,
    pub tool_calls: u32,
    pub finish_reason: FinishReason,
    pub budget_exhausted: bool,
    pub usage: TurnUsage,
}

pub struct StreamingOrchestrator {
    model: Arc<dyn ModelProvider>,
    tools: ToolRegistry,
}

struct StepResult {
    text: String,
    tool_calls: Vec<AssembledToolCall>,
    finish_reason: Option<String>,
    usage: Option<UnifiedTokenUsage>,
}

impl StreamingOrchestrator {
    pub fn new(model: Arc<dyn ModelProvider>, tools: ToolRegistry) -> Self {
        Self { model, tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Drive the step loop. The caller owns `start` and `finish` on the writer.
    pub async fn run(
        &self,
        mut messages: Vec<ChatMessage>,
        step_budget: u32,
        writer: &mut StreamWriter,
        cancel: &CancellationToken,
    ) -> CampusResult<RunOutcome> {
        let definitions = self.tools.definitions();
        let mut tool_calls_run = 0u32;
        let mut usage = TurnUsage::default();

        for step in 1..=step_budget {
            if cancel.is_cancelled() || writer.is_closed() {
                return Err(CampusError::Cancelled);
            }
            debug!(
                "Starting step: step={}, budget={}, messages={}",
                step,
                step_budget,
                messages.len()
            );
            writer.start_step().await;

            let request = ModelRequest {
                messages: messages.clone(),
                tools: definitions.clone(),
            };
            let result = self.stream_step(request, writer, cancel).await?;
            if let Some(step_usage) = &result.usage {
                usage.add(step_usage);
            }

            if result.tool_calls.is_empty() {
                writer.finish_step().await;
                let finish_reason = result
                    .finish_reason
                    .as_deref()
                    .map(FinishReason::from_provider)
                    .unwrap_or(FinishReason::Stop);
                return Ok(RunOutcome {
                    steps: step,
                    tool_calls: tool_calls_run,
                    finish_reason,
                    budget_exhausted: false,
                    usage,
                });
            }

            let text = Some(result.text).filter(|t| !t.is_empty());
            messages.push(ChatMessage::assistant_tool_calls(
                text,
                result
                    .tool_calls
                    .iter()
                    .map(AssembledToolCall::to_chat_tool_call)
                    .collect(),
            ));

            for call in result.tool_calls {
                let content = self.run_tool(&call, writer, cancel).await?;
                messages.push(ChatMessage::tool(call.id, content));
                tool_calls_run += 1;
            }
            writer.finish_step().await;
        }

        info!(
            "Step budget exhausted: budget={}, tool_calls={}",
            step_budget, tool_calls_run
        );
        Ok(RunOutcome {
            steps: step_budget,
            tool_calls: tool_calls_run,
            finish_reason: FinishReason::ToolCalls,
            budget_exhausted: true,
            usage,
        })
    }

    async fn stream_step(
        &self,
        request: ModelRequest,
        writer: &mut StreamWriter,
        cancel: &CancellationToken,
    ) -> CampusResult<StepResult> {
        let mut stream = tokio::select! {
            _ = cancel.cancelled() => return Err(CampusError::Cancelled),
            stream = self.model.stream(request) => stream?,
        };

        let mut text = String::new();
        let mut accumulator = ToolCallAccumulator::default();
        let mut finish_reason = None;
        let mut usage = None;

        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CampusError::Cancelled),
                item = stream.recv() => item,
            };
            let Some(item) = item else {
                break;
            };
            let response = item.map_err(CampusError::from)?;

            if let Some(reasoning) = response.reasoning_content.as_deref() {
                writer.reasoning_delta(reasoning).await;
            }
            if let Some(delta) = response.text.as_deref() {
                text.push_str(delta);
                writer.text_delta(delta).await;
            }
            if let Some(tool_call) = response.tool_call {
                accumulator.push(tool_call);
            }
            if let Some(reason) = response.finish_reason {
                finish_reason = Some(reason);
            }
            if let Some(reported) = response.usage {
                usage = Some(reported);
            }
            if writer.is_closed() {
                return Err(CampusError::Cancelled);
            }
        }

        writer.close_blocks().await;
        Ok(StepResult {
            text,
            tool_calls: accumulator.finish(),
            finish_reason,
            usage,
        })
    }

    async fn run_tool(
        &self,
        call: &AssembledToolCall,
        writer: &mut StreamWriter,
        cancel: &CancellationToken,
    ) -> CampusResult<String> {
        let input = serde_json::from_str::<Value>(&call.arguments)
            .unwrap_or_else(|_| Value::String(call.arguments.clone()));
        writer
            .tool_input_available(&call.id, &call.name, input)
            .await;

        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(CampusError::Cancelled),
            result = self.tools.dispatch(&call.name, &call.arguments) => result,
        };
        if result.outcome.is_failed() {
            warn!("Tool call failed: name={}, id={}", call.name, call.id);
        }

        writer
            .tool_output_available(&call.id, Value::String(result.result_for_assistant.clone()))
            .await;
        Ok(result.result_for_assistant)
    }
}
