use super::unified::{UnifiedResponse, UnifiedTokenUsage, UnifiedToolCall};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PromptTokensDetails {
    cached_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
    prompt_tokens_details: Option<PromptTokensDetails>,
}

impl From<OpenAIUsage> for UnifiedTokenUsage {
    fn from(usage: OpenAIUsage) -> Self {
        Self {
            prompt_token_count: usage.prompt_tokens,
            candidates_token_count: usage.completion_tokens,
            total_token_count: usage.total_tokens,
            cached_content_token_count: usage
                .prompt_tokens_details
                .and_then(|details| details.cached_tokens),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    /// Reasoning models served through OpenAI-compatible gateways use either name.
    #[serde(alias = "reasoning")]
    reasoning_content: Option<String>,
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize, Clone)]
struct OpenAIToolCall {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<FunctionCall>,
}

impl From<OpenAIToolCall> for UnifiedToolCall {
    fn from(tool_call: OpenAIToolCall) -> Self {
        let (name, arguments) = match tool_call.function {
            Some(function) => (function.name, function.arguments),
            None => (None, None),
        };
        Self {
            index: tool_call.index,
            id: tool_call.id,
            name,
            arguments,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
struct FunctionCall {
    name: Option<String>,
    arguments: Option<String>,
}

/// One `chat.completion.chunk` payload.
#[derive(Debug, Deserialize)]
pub struct OpenAISSEData {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<OpenAIUsage>,
}

impl OpenAISSEData {
    pub fn is_choices_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn first_choice_tool_call_count(&self) -> usize {
        self.choices
            .first()
            .and_then(|choice| choice.delta.tool_calls.as_ref())
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Split the chunk into unified events.
    ///
    /// Text/reasoning come first, then one event per tool call fragment. Usage
    /// and finish reason ride on the first event only.
    pub fn into_unified_responses(self) -> Vec<UnifiedResponse> {
        let mut usage = self.usage.map(UnifiedTokenUsage::from);

        let Some(first_choice) = self.choices.into_iter().next() else {
            // Final usage chunk arrives with `choices: []`.
            return usage
                .map(|usage| {
                    vec![UnifiedResponse {
                        usage: Some(usage),
                        ..Default::default()
                    }]
                })
                .unwrap_or_default();
        };

        let Choice {
            delta,
            mut finish_reason,
        } = first_choice;
        let Delta {
            reasoning_content,
            content,
            tool_calls,
        } = delta;

        let mut responses = Vec::new();

        if content.is_some() || reasoning_content.is_some() {
            responses.push(UnifiedResponse {
                text: content,
                reasoning_content,
                tool_call: None,
                usage: usage.take(),
                finish_reason: finish_reason.take(),
            });
        }

        for tool_call in tool_calls.unwrap_or_default() {
            let is_first_event = responses.is_empty();
            responses.push(UnifiedResponse {
                tool_call: Some(UnifiedToolCall::from(tool_call)),
                usage: if is_first_event { usage.take() } else { None },
                finish_reason: if is_first_event {
                    finish_reason.take()
                } else {
                    None
                },
                ..Default::default()
            });
        }

        if responses.is_empty() {
            responses.push(UnifiedResponse {
                usage,
                finish_reason,
                ..Default::default()
            });
        }

        responses
    }
}

#[cfg(test)]
mod tests {
    use super::OpenAISSEData;

    fn parse(raw: &str) -> OpenAISSEData {
        serde_json::from_str(raw).expect("valid openai sse data")
    }

    #[test]
    fn text_chunk_becomes_single_text_event() {
        let responses = parse(
            r#"{"object":"chat.completion.chunk","choices":[{"index":0,"delta":{"role":"assistant","content":"IIM A"},"finish_reason":null}]}"#,
        )
        .into_unified_responses();

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].text.as_deref(), Some("IIM A"));
        assert!(responses[0].tool_call.is_none());
    }

    #[test]
    fn reasoning_alias_is_accepted() {
        let responses = parse(
            r#"{"choices":[{"index":0,"delta":{"reasoning":"thinking"}}]}"#,
        )
        .into_unified_responses();

        assert_eq!(responses[0].reasoning_content.as_deref(), Some("thinking"));
        assert!(responses[0].text.is_none());
    }

    #[test]
    fn tool_call_fragments_keep_their_index() {
        let first = parse(
            r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_kb","type":"function","function":{"name":"knowledgeBaseSearch","arguments":""}}]}}]}"#,
        )
        .into_unified_responses();
        let second = parse(
            r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"query\":"}}]}}]}"#,
        )
        .into_unified_responses();

        let first_call = first[0].tool_call.as_ref().expect("tool call");
        assert_eq!(first_call.index, 0);
        assert_eq!(first_call.id.as_deref(), Some("call_kb"));
        assert_eq!(first_call.name.as_deref(), Some("knowledgeBaseSearch"));

        let second_call = second[0].tool_call.as_ref().expect("tool call");
        assert!(second_call.id.is_none());
        assert_eq!(second_call.arguments.as_deref(), Some("{\"query\":"));
    }

    #[test]
    fn finish_reason_and_usage_ride_on_first_event_only() {
        let responses = parse(
            r#"{"choices":[{"index":0,"delta":{"content":"ok","tool_calls":[{"index":0,"id":"c1","function":{"name":"webSearch","arguments":"{}"}}]},"finish_reason":"tool_calls"}],"usage":{"prompt_tokens":4,"completion_tokens":2,"total_tokens":6,"prompt_tokens_details":{"cached_tokens":1}}}"#,
        )
        .into_unified_responses();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].finish_reason.as_deref(), Some("tool_calls"));
        assert_eq!(
            responses[0]
                .usage
                .as_ref()
                .and_then(|usage| usage.cached_content_token_count),
            Some(1)
        );
        assert!(responses[1].finish_reason.is_none());
        assert!(responses[1].usage.is_none());
    }

    #[test]
    fn usage_only_chunk_is_kept_and_empty_chunk_dropped() {
        let usage_only = parse(
            r#"{"choices":[],"usage":{"prompt_tokens":7,"completion_tokens":3,"total_tokens":10}}"#,
        )
        .into_unified_responses();
        assert_eq!(usage_only.len(), 1);
        assert_eq!(
            usage_only[0].usage.as_ref().map(|u| u.total_token_count),
            Some(10)
        );

        let empty = parse(r#"{"choices":[],"usage":null}"#).into_unified_responses();
        assert!(empty.is_empty());
    }

    #[test]
    fn bare_finish_chunk_still_yields_an_event() {
        let responses = parse(r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#)
            .into_unified_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].finish_reason.as_deref(), Some("stop"));
    }
}
