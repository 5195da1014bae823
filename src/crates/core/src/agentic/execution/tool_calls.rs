use campus_ai_adapters::{ChatToolCall, UnifiedToolCall};
use log::warn;
use std::collections::BTreeMap;

/// A tool call whose argument fragments have all arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl AssembledToolCall {
    pub fn to_chat_tool_call(&self) -> ChatToolCall {
        ChatToolCall::function(&self.id, &self.name, &self.arguments)
    }
}

#[derive(Debug, Default)]
struct PendingToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

/// Collects streamed tool call fragments keyed by their index.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    pending: BTreeMap<usize, PendingToolCall>,
}

impl ToolCallAccumulator {
    pub fn push(&mut self, fragment: UnifiedToolCall) {
        let entry = self.pending.entry(fragment.index).or_default();
        if let Some(id) = fragment.id.filter(|id| !id.is_empty()) {
            entry.id.get_or_insert(id);
        }
        if let Some(name) = fragment.name.filter(|name| !name.is_empty()) {
            if entry.name.is_empty() {
                entry.name = name;
            }
        }
        if let Some(arguments) = fragment.arguments {
            entry.arguments.push_str(&arguments);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Calls in index order. Fragments that never named a tool are dropped.
    pub fn finish(self) -> Vec<AssembledToolCall> {
        self.pending
            .into_iter()
            .filter_map(|(index, call)| {
                if call.name.is_empty() {
                    warn!("Discarding tool call without a name: index={}", index);
                    return None;
                }
                Some(AssembledToolCall {
                    id: call
                        .id
                        .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple())),
                    name: call.name,
                    arguments: call.arguments,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(index: usize, id: Option<&str>, name: Option<&str>, args: &str) -> UnifiedToolCall {
        UnifiedToolCall {
            index,
            id: id.map(str::to_string),
            name: name.map(str::to_string),
            arguments: Some(args.to_string()),
        }
    }

    #[test]
    fn joins_fragments_per_index_in_order() {
        let mut acc = ToolCallAccumulator::default();
        acc.push(fragment(1, Some("call_b"), Some("webSearch"), "{\"query\":"));
        acc.push(fragment(0, Some("call_a"), Some("knowledgeBaseSearch"), "{\"query\""));
        acc.push(fragment(0, None, None, ":\"fees\"}"));
        acc.push(fragment(1, None, None, "\"cutoff\"}"));

        let calls = acc.finish();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].arguments, "{\"query\":\"fees\"}");
        assert_eq!(calls[1].name, "webSearch");
        assert_eq!(calls[1].arguments, "{\"query\":\"cutoff\"}");
    }

    #[test]
    fn generates_missing_ids_and_drops_nameless_calls() {
        let mut acc = ToolCallAccumulator::default();
        acc.push(fragment(0, None, Some("webSearch"), "{}"));
        acc.push(fragment(1, Some("call_x"), None, "{}"));

        let calls = acc.finish();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].id.starts_with("call_"));
    }
}
