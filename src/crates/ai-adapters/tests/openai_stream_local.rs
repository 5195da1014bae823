use campus_ai_adapters::{ChatCompletionRequest, ChatMessage, OpenAIClient, OpenAIClientConfig};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve one canned HTTP response on a local port and return its base URL.
async fn serve_once(status_line: &'static str, content_type: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");
        let mut buf = [0u8; 8192];
        let _ = socket.read(&mut buf).await.expect("read request");

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            content_type,
            body.len(),
            body
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
    });

    format!("http://{}/v1", addr)
}

/// Send SSE headers and one chunk, then stay silent. The returned receiver
/// fires once the client closes the connection.
async fn serve_stalled_stream(first_chunk: &'static str) -> (String, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local addr");
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");
        let mut buf = [0u8; 8192];
        let _ = socket.read(&mut buf).await.expect("read request");

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\ndata: {}\n\n",
            first_chunk
        );
        socket
            .write_all(head.as_bytes())
            .await
            .expect("write response head");

        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(());
    });

    (format!("http://{}/v1", addr), closed_rx)
}

fn client_with_idle_timeout(base_url: String, idle_timeout: Duration) -> OpenAIClient {
    OpenAIClient::new(OpenAIClientConfig {
        base_url,
        api_key: Some("test-key".to_string()),
        idle_timeout,
    })
    .expect("client builds")
}

fn client_for(base_url: String) -> OpenAIClient {
    client_with_idle_timeout(base_url, Duration::from_secs(5))
}

fn request() -> ChatCompletionRequest {
    ChatCompletionRequest::streaming("gpt-test", vec![ChatMessage::user("hello")])
}

#[tokio::test]
async fn streams_text_and_tool_call_fragments() {
    let body = [
        r#"data: {"object":"chat.completion.chunk","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#,
        r#"data: {"object":"chat.completion.chunk","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_1","type":"function","function":{"name":"webSearch","arguments":"{\"query\""}}]}}]}"#,
        r#"data: {"object":"chat.completion.chunk","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":":\"cat\"}"}}]},"finish_reason":"tool_calls"}]}"#,
        "data: [DONE]",
    ]
    .iter()
    .map(|line| format!("{}\n\n", line))
    .collect::<String>();

    let base_url = serve_once("200 OK", "text/event-stream", body).await;
    let mut rx = client_for(base_url)
        .stream_chat(&request())
        .await
        .expect("request accepted");

    let mut events = Vec::new();
    while let Some(item) = rx.recv().await {
        events.push(item.expect("no stream error"));
    }

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].text.as_deref(), Some("Hi"));
    let first_call = events[1].tool_call.as_ref().expect("tool call fragment");
    assert_eq!(first_call.name.as_deref(), Some("webSearch"));
    assert_eq!(events[2].finish_reason.as_deref(), Some("tool_calls"));
    assert_eq!(
        events[2]
            .tool_call
            .as_ref()
            .and_then(|call| call.arguments.as_deref()),
        Some(":\"cat\"}")
    );
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let base_url = serve_once(
        "401 Unauthorized",
        "application/json",
        r#"{"error":{"message":"invalid api key"}}"#.to_string(),
    )
    .await;

    let err = client_for(base_url)
        .stream_chat(&request())
        .await
        .expect_err("request rejected");
    let message = err.to_string();
    assert!(message.contains("401"), "unexpected error: {}", message);
    assert!(message.contains("invalid api key"), "unexpected error: {}", message);
}

#[tokio::test]
async fn stream_error_payload_is_forwarded() {
    let body = "data: {\"error\":{\"message\":\"upstream overloaded\"}}\n\n".to_string();
    let base_url = serve_once("200 OK", "text/event-stream", body).await;

    let mut rx = client_for(base_url)
        .stream_chat(&request())
        .await
        .expect("request accepted");

    let first = rx.recv().await.expect("one item");
    let err = first.expect_err("stream error");
    assert!(err.to_string().contains("upstream overloaded"));
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn dropping_receiver_releases_stalled_connection() {
    let (base_url, upstream_closed) = serve_stalled_stream(
        r#"{"object":"chat.completion.chunk","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#,
    )
    .await;

    let mut rx = client_with_idle_timeout(base_url, Duration::from_secs(600))
        .stream_chat(&request())
        .await
        .expect("request accepted");

    let first = rx.recv().await.expect("one item").expect("no stream error");
    assert_eq!(first.text.as_deref(), Some("Hi"));
    drop(rx);

    tokio::time::timeout(Duration::from_secs(5), upstream_closed)
        .await
        .expect("connection closed well before the idle timeout")
        .expect("server observed the close");
}
