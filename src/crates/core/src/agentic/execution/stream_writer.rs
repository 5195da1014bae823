//! Stateful writer for the UI message stream.
//!
//! Text and reasoning blocks are opened lazily on the first delta and closed
//! before tool events, step boundaries and `finish`. Ids are `txt_N` and
//! `rsn_N`, fresh per block. `finish` goes out at most once; everything after
//! it is dropped. A failed send means the client is gone: the writer marks
//! itself closed and ignores further writes.

use crate::service::moderation::DENIAL_TEXT_ID;
use campus_core_types::{FinishReason, UIStreamEvent};
use log::{debug, trace};
use serde_json::Value;
use tokio::sync::mpsc;

pub struct StreamWriter {
    tx: mpsc::Sender<UIStreamEvent>,
    started: bool,
    step_open: bool,
    finished: bool,
    closed: bool,
    text_open: bool,
    text_counter: u32,
    reasoning_open: bool,
    reasoning_counter: u32,
}

impl StreamWriter {
    pub fn new(tx: mpsc::Sender<UIStreamEvent>) -> Self {
        Self {
            tx,
            started: false,
            step_open: false,
            finished: false,
            closed: false,
            text_open: false,
            text_counter: 0,
            reasoning_open: false,
            reasoning_counter: 0,
        }
    }

    /// Receiver dropped.
    pub fn is_closed(&self) -> bool {
        self.closed || self.tx.is_closed()
    }

    async fn send(&mut self, event: UIStreamEvent) {
        if self.closed {
            return;
        }
        trace!("Stream event: {:?}", event);
        if self.tx.send(event).await.is_err() {
            debug!("Stream receiver dropped, discarding further events");
            self.closed = true;
        }
    }

    fn text_id(&self) -> String {
        format!("txt_{}", self.text_counter)
    }

    fn reasoning_id(&self) -> String {
        format!("rsn_{}", self.reasoning_counter)
    }

    pub async fn start(&mut self, message_id: Option<String>) {
        if self.started || self.finished {
            return;
        }
        self.started = true;
        self.send(UIStreamEvent::Start { message_id }).await;
    }

    pub async fn start_step(&mut self) {
        if self.finished {
            return;
        }
        self.start(None).await;
        self.close_blocks().await;
        if self.step_open {
            self.send(UIStreamEvent::FinishStep).await;
        }
        self.step_open = true;
        self.send(UIStreamEvent::StartStep).await;
    }

    pub async fn text_delta(&mut self, delta: &str) {
        if self.finished || delta.is_empty() {
            return;
        }
        self.start(None).await;
        self.close_reasoning().await;
        if !self.text_open {
            self.text_open = true;
            self.send(UIStreamEvent::text_start(self.text_id())).await;
        }
        self.send(UIStreamEvent::text_delta(self.text_id(), delta))
            .await;
    }

    pub async fn reasoning_delta(&mut self, delta: &str) {
        if self.finished || delta.is_empty() {
            return;
        }
        self.start(None).await;
        self.close_text().await;
        if !self.reasoning_open {
            self.reasoning_open = true;
            self.send(UIStreamEvent::reasoning_start(self.reasoning_id()))
                .await;
        }
        self.send(UIStreamEvent::reasoning_delta(self.reasoning_id(), delta))
            .await;
    }

    async fn close_text(&mut self) {
        if self.text_open {
            self.send(UIStreamEvent::text_end(self.text_id())).await;
            self.text_open = false;
            self.text_counter += 1;
        }
    }

    async fn close_reasoning(&mut self) {
        if self.reasoning_open {
            self.send(UIStreamEvent::reasoning_end(self.reasoning_id()))
                .await;
            self.reasoning_open = false;
            self.reasoning_counter += 1;
        }
    }

    pub async fn close_blocks(&mut self) {
        self.close_reasoning().await;
        self.close_text().await;
    }

    pub async fn tool_input_available(&mut self, tool_call_id: &str, tool_name: &str, input: Value) {
        if self.finished {
            return;
        }
        self.start(None).await;
        self.close_blocks().await;
        self.send(UIStreamEvent::ToolInputAvailable {
            tool_call_id: tool_call_id.to_string(),
            tool_name: tool_name.to_string(),
            input,
        })
        .await;
    }

    pub async fn tool_output_available(&mut self, tool_call_id: &str, output: Value) {
        if self.finished {
            return;
        }
        self.send(UIStreamEvent::ToolOutputAvailable {
            tool_call_id: tool_call_id.to_string(),
            output,
        })
        .await;
    }

    pub async fn finish_step(&mut self) {
        if self.finished || !self.step_open {
            return;
        }
        self.close_blocks().await;
        self.step_open = false;
        self.send(UIStreamEvent::FinishStep).await;
    }

    /// Error event; the stream stays open for the terminal `finish`.
    pub async fn error(&mut self, error_text: impl Into<String>) {
        if self.finished {
            return;
        }
        self.start(None).await;
        self.close_blocks().await;
        self.finish_step().await;
        self.send(UIStreamEvent::error(error_text)).await;
    }

    /// Closes the open step first so nothing step-scoped follows `abort`.
    pub async fn abort(&mut self, reason: Option<String>) {
        if self.finished {
            return;
        }
        self.start(None).await;
        self.finish_step().await;
        self.close_blocks().await;
        self.send(UIStreamEvent::Abort { reason }).await;
    }

    pub async fn finish(&mut self, finish_reason: Option<FinishReason>) {
        if self.finished {
            return;
        }
        self.start(None).await;
        self.finish_step().await;
        self.close_blocks().await;
        self.finished = true;
        self.send(UIStreamEvent::finish(finish_reason)).await;
    }

    /// Complete stream for a moderated request: a single text block, then
    /// `finish`.
    pub async fn write_denial(&mut self, message: &str) {
        if self.started || self.finished {
            return;
        }
        self.start(None).await;
        self.send(UIStreamEvent::text_start(DENIAL_TEXT_ID)).await;
        self.send(UIStreamEvent::text_delta(DENIAL_TEXT_ID, message))
            .await;
        self.send(UIStreamEvent::text_end(DENIAL_TEXT_ID)).await;
        self.finished = true;
        self.send(UIStreamEvent::finish(None)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn writer() -> (StreamWriter, mpsc::Receiver<UIStreamEvent>) {
        let (tx, rx) = mpsc::channel(64);
        (StreamWriter::new(tx), rx)
    }

    fn drain(rx: &mut mpsc::Receiver<UIStreamEvent>) -> Vec<UIStreamEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn denial_is_five_events() {
        let (mut writer, mut rx) = writer();
        writer.write_denial("policy violation").await;
        writer.finish(None).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                UIStreamEvent::Start { message_id: None },
                UIStreamEvent::text_start("moderation-denial-text"),
                UIStreamEvent::text_delta("moderation-denial-text", "policy violation"),
                UIStreamEvent::text_end("moderation-denial-text"),
                UIStreamEvent::finish(None),
            ]
        );
    }

    #[tokio::test]
    async fn blocks_close_before_tools_and_finish() {
        let (mut writer, mut rx) = writer();
        writer.start(Some("msg_1".to_string())).await;
        writer.start_step().await;
        writer.reasoning_delta("thinking").await;
        writer.text_delta("Let me ").await;
        writer.text_delta("check.").await;
        writer
            .tool_input_available("call_1", "knowledgeBaseSearch", json!({"query": "fees"}))
            .await;
        writer.tool_output_available("call_1", json!("NO_RESULTS")).await;
        writer.finish_step().await;
        writer.start_step().await;
        writer.text_delta("Done").await;
        writer.finish(Some(FinishReason::Stop)).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                UIStreamEvent::start("msg_1"),
                UIStreamEvent::StartStep,
                UIStreamEvent::reasoning_start("rsn_0"),
                UIStreamEvent::reasoning_delta("rsn_0", "thinking"),
                UIStreamEvent::reasoning_end("rsn_0"),
                UIStreamEvent::text_start("txt_0"),
                UIStreamEvent::text_delta("txt_0", "Let me "),
                UIStreamEvent::text_delta("txt_0", "check."),
                UIStreamEvent::text_end("txt_0"),
                UIStreamEvent::ToolInputAvailable {
                    tool_call_id: "call_1".to_string(),
                    tool_name: "knowledgeBaseSearch".to_string(),
                    input: json!({"query": "fees"}),
                },
                UIStreamEvent::ToolOutputAvailable {
                    tool_call_id: "call_1".to_string(),
                    output: json!("NO_RESULTS"),
                },
                UIStreamEvent::FinishStep,
                UIStreamEvent::StartStep,
                UIStreamEvent::text_start("txt_1"),
                UIStreamEvent::text_delta("txt_1", "Done"),
                UIStreamEvent::text_end("txt_1"),
                UIStreamEvent::FinishStep,
                UIStreamEvent::finish(Some(FinishReason::Stop)),
            ]
        );
    }

    #[tokio::test]
    async fn finish_is_emitted_once_and_seals_the_stream() {
        let (mut writer, mut rx) = writer();
        writer.text_delta("hi").await;
        writer.error("model failed").await;
        writer.finish(Some(FinishReason::Error)).await;
        writer.finish(Some(FinishReason::Stop)).await;
        writer.text_delta("late").await;

        let events = drain(&mut rx);
        assert_eq!(events.iter().filter(|e| e.is_finish()).count(), 1);
        assert_eq!(events.last(), Some(&UIStreamEvent::finish(Some(FinishReason::Error))));
        assert_eq!(events[0], UIStreamEvent::Start { message_id: None });
        assert!(events.contains(&UIStreamEvent::text_end("txt_0")));
    }

    #[tokio::test]
    async fn abort_closes_step_before_terminal_events() {
        let (mut writer, mut rx) = writer();
        writer.start(Some("msg_1".to_string())).await;
        writer.start_step().await;
        writer.text_delta("partial").await;
        writer.abort(Some("cancelled".to_string())).await;
        writer.finish(None).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                UIStreamEvent::start("msg_1"),
                UIStreamEvent::StartStep,
                UIStreamEvent::text_start("txt_0"),
                UIStreamEvent::text_delta("txt_0", "partial"),
                UIStreamEvent::text_end("txt_0"),
                UIStreamEvent::FinishStep,
                UIStreamEvent::Abort {
                    reason: Some("cancelled".to_string())
                },
                UIStreamEvent::finish(None),
            ]
        );
    }

    #[tokio::test]
    async fn dropped_receiver_marks_writer_closed() {
        let (mut writer, rx) = writer();
        drop(rx);
        writer.text_delta("hello").await;
        assert!(writer.is_closed());
    }
}
