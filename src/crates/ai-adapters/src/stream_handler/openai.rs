use crate::types::openai::OpenAISSEData;
use crate::types::unified::UnifiedResponse;
use anyhow::{anyhow, Result};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use log::{debug, error, trace, warn};
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

const OPENAI_CHAT_COMPLETION_CHUNK_OBJECT: &str = "chat.completion.chunk";

/// Chunks without an `object` field are accepted; several compatible gateways
/// omit it. Anything carrying a different object type is skipped.
fn is_chat_completion_chunk(event_json: &Value) -> bool {
    match event_json.get("object").and_then(Value::as_str) {
        Some(object) => object == OPENAI_CHAT_COMPLETION_CHUNK_OBJECT,
        None => event_json.get("choices").is_some(),
    }
}

fn extract_sse_api_error_message(event_json: &Value) -> Option<String> {
    let error = event_json.get("error")?;
    if let Some(message) = error.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    if let Some(message) = error.as_str() {
        return Some(message.to_string());
    }
    Some("An error occurred during streaming".to_string())
}

fn send(
    tx_event: &mpsc::UnboundedSender<Result<UnifiedResponse>>,
    item: Result<UnifiedResponse>,
) -> bool {
    tx_event.send(item).is_ok()
}

/// Convert an SSE `chat/completions` response into unified events.
///
/// Returns when the provider sends `[DONE]`, when the stream fails (an `Err` is
/// sent first), or as soon as the receiving side is dropped, even while the
/// upstream connection is silent. Returning drops `response` and with it the
/// connection.
///
/// # Arguments
/// * `response` - HTTP response with an `text/event-stream` body
/// * `tx_event` - parsed event sender
/// * `idle_timeout` - maximum wait between two SSE events
pub async fn handle_openai_stream(
    response: Response,
    tx_event: mpsc::UnboundedSender<Result<UnifiedResponse>>,
    idle_timeout: Duration,
) {
    let mut stream = response.bytes_stream().eventsource();
    let mut saw_finish_reason = false;

    loop {
        let next = tokio::select! {
            _ = tx_event.closed() => {
                debug!("OpenAI stream receiver dropped, stopping SSE consumption");
                return;
            }
            next = timeout(idle_timeout, stream.next()) => next,
        };

        let sse = match next {
            Ok(Some(Ok(sse))) => sse,
            Ok(None) => {
                if saw_finish_reason {
                    debug!("OpenAI SSE stream closed without [DONE] after finish_reason");
                    return;
                }
                let error_msg = "SSE stream closed before response completed";
                error!("{}", error_msg);
                send(&tx_event, Err(anyhow!(error_msg)));
                return;
            }
            Ok(Some(Err(e))) => {
                let error_msg = format!("SSE stream error: {}", e);
                error!("{}", error_msg);
                send(&tx_event, Err(anyhow!(error_msg)));
                return;
            }
            Err(_) => {
                let error_msg = format!("SSE stream timeout after {}s", idle_timeout.as_secs());
                error!("{}", error_msg);
                send(&tx_event, Err(anyhow!(error_msg)));
                return;
            }
        };

        let raw = sse.data;
        trace!(target: "ai", "OpenAI SSE: {:?}", raw);
        if raw.trim() == "[DONE]" {
            return;
        }
        if raw.trim().is_empty() {
            continue;
        }

        let event_json: Value = match serde_json::from_str(&raw) {
            Ok(json) => json,
            Err(e) => {
                let error_msg = format!("SSE parsing error: {}, data: {}", e, &raw);
                error!("{}", error_msg);
                send(&tx_event, Err(anyhow!(error_msg)));
                return;
            }
        };

        if let Some(api_error_message) = extract_sse_api_error_message(&event_json) {
            let error_msg = format!("SSE API error: {}, data: {}", api_error_message, raw);
            error!("{}", error_msg);
            send(&tx_event, Err(anyhow!(error_msg)));
            return;
        }

        if !is_chat_completion_chunk(&event_json) {
            warn!(
                "Skipping non-standard OpenAI SSE event; object={}",
                event_json
                    .get("object")
                    .and_then(Value::as_str)
                    .unwrap_or("<missing>")
            );
            continue;
        }

        let sse_data: OpenAISSEData = match serde_json::from_value(event_json) {
            Ok(event) => event,
            Err(e) => {
                let error_msg = format!("SSE data schema error: {}, data: {}", e, &raw);
                error!("{}", error_msg);
                send(&tx_event, Err(anyhow!(error_msg)));
                return;
            }
        };

        let tool_call_count = sse_data.first_choice_tool_call_count();
        if tool_call_count > 1 {
            warn!(
                "OpenAI SSE chunk contains {} tool calls in the first choice; splitting and sending sequentially",
                tool_call_count
            );
        }

        let has_empty_choices = sse_data.is_choices_empty();
        let unified_responses = sse_data.into_unified_responses();
        if unified_responses.is_empty() {
            if has_empty_choices {
                // Keepalive/metadata chunk.
                continue;
            }
            let error_msg = format!("OpenAI SSE chunk produced no unified events, data: {}", raw);
            error!("{}", error_msg);
            send(&tx_event, Err(anyhow!(error_msg)));
            return;
        }

        for unified_response in unified_responses {
            if unified_response.finish_reason.is_some() {
                saw_finish_reason = true;
            }
            if !send(&tx_event, Ok(unified_response)) {
                return;
            }
        }
    }
}
