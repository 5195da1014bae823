use super::framework::{Tool, ToolOutcome, ToolResult};
use campus_ai_adapters::ToolDefinition;
use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

/// Tools offered to the model, in registration order.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!("Tool replaced in registry: name={}", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Run a tool by name with the raw JSON arguments the model produced.
    ///
    /// Unknown tools and unparsable arguments become failure text.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> ToolResult {
        let Some(tool) = self.get(name) else {
            warn!("Model requested unknown tool: name={}", name);
            return failure(format!("Tool '{}' is not available.", name));
        };

        let input: Value = if arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(arguments) {
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        "Tool arguments are not valid JSON: name={}, error={}",
                        name, e
                    );
                    return failure(format!(
                        "Tool '{}' received invalid arguments: {}",
                        name, e
                    ));
                }
            }
        };

        debug!("Dispatching tool: name={}", name);
        tool.call(&input).await
    }
}

fn failure(text: String) -> ToolResult {
    ToolResult {
        outcome: ToolOutcome::Failed(text.clone()),
        result_for_assistant: text,
    }
}
