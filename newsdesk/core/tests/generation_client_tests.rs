//! Generation client integration tests
//!
//! Each test starts a one-shot HTTP stub on a loopback port, points a
//! [`GenerationClient`] at it, and checks both the request on the wire and
//! the result handed back to the caller.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use newsdesk_core::{GenerationClient, GenerationConfig, GenerationError, TextGenerator};

// =============================================================================
// HTTP Stub
// =============================================================================

/// Request as seen by the stub
#[derive(Debug)]
struct CapturedRequest {
    head: String,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// Serve one connection: read the request, answer with `status` and the body
/// written as the given chunks (flushed separately).
async fn serve_once(
    status: u16,
    chunks: Vec<&'static str>,
) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/api/generate", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let body_len: usize = chunks.iter().map(|c| c.len()).sum();
        let head = format!(
            "HTTP/1.1 {status} {}\r\nContent-Type: application/x-ndjson\r\nContent-Length: {body_len}\r\nConnection: close\r\n\r\n",
            reason(status)
        );
        // The client may hang up early (error statuses), so write failures
        // are not test failures.
        let _ = socket.write_all(head.as_bytes()).await;
        for chunk in chunks {
            let _ = socket.write_all(chunk.as_bytes()).await;
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let _ = socket.shutdown().await;
        request
    });

    (url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().unwrap())
        })
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending body");
        buf.extend_from_slice(&chunk[..n]);
    }

    CapturedRequest {
        head,
        body: buf[head_end..head_end + content_length].to_vec(),
    }
}

fn client_for(url: &str) -> GenerationClient {
    GenerationClient::new(GenerationConfig {
        service_url: url.to_string(),
        default_model: "llama3.2".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
    })
    .unwrap()
}

// =============================================================================
// Success Path
// =============================================================================

#[tokio::test]
async fn test_request_shape_on_the_wire() {
    let (url, server) = serve_once(200, vec!["{\"response\": \"ok\"}\n"]).await;
    let client = client_for(&url);

    let text = client.generate("Summarize the news").await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(text, "ok");
    assert!(request.head.starts_with("POST /api/generate HTTP/1.1"));
    assert_eq!(
        request.header("content-type").as_deref(),
        Some("application/json")
    );
    assert_eq!(
        request.json(),
        serde_json::json!({ "model": "llama3.2", "prompt": "Summarize the news" })
    );
}

#[tokio::test]
async fn test_explicit_model_is_sent() {
    let (url, server) = serve_once(200, vec!["{\"response\": \"x\"}\n"]).await;
    let client = client_for(&url);

    client.generate_with_model("Hi", "mistral").await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(request.json()["model"], "mistral");
}

#[tokio::test]
async fn test_streamed_fragments_are_concatenated_in_order() {
    let (url, server) = serve_once(
        200,
        vec![
            "{\"response\": \"  Hello\", \"done\": false}\n",
            "{\"response\": \" wor",
            "ld\", \"done\": false}\n{\"response\": \"!\\n\", \"done\": false}\n",
            "{\"response\": \"\", \"done\": true, \"eval_count\": 4}\n",
        ],
    )
    .await;
    let client = client_for(&url);

    let text = client.generate("Greet").await.unwrap();
    server.await.unwrap();

    assert_eq!(text, "Hello world!");
}

#[tokio::test]
async fn test_empty_body_is_empty_success() {
    let (url, server) = serve_once(200, vec![]).await;
    let client = client_for(&url);

    let text = client.generate("Anything").await.unwrap();
    server.await.unwrap();

    assert_eq!(text, "");
}

// =============================================================================
// Failure Paths
// =============================================================================

#[tokio::test]
async fn test_not_found_is_service_error() {
    let (url, server) = serve_once(404, vec!["{\"error\": \"model 'x' not found\"}\n"]).await;
    let client = client_for(&url);

    let err = client.generate("Hi").await.unwrap_err();
    server.await.unwrap();

    assert_eq!(err.status_code(), Some(404));
    assert_eq!(
        err.to_string(),
        "Received status code 404 from generation service"
    );
}

#[tokio::test]
async fn test_any_non_200_is_service_error() {
    // A 2xx other than 200 still carries no usable stream
    let (url, server) = serve_once(204, vec![]).await;
    let client = client_for(&url);

    let err = client.generate("Hi").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, GenerationError::Service { status: 204, .. }));
}

#[tokio::test]
async fn test_malformed_line_is_decode_error() {
    let (url, server) = serve_once(
        200,
        vec!["{\"response\": \"Hello\"}\n", "<html>oops</html>\n"],
    )
    .await;
    let client = client_for(&url);

    let err = client.generate("Hi").await.unwrap_err();
    server.await.unwrap();

    match err {
        GenerationError::StreamDecode { line, .. } => assert_eq!(line, "<html>oops</html>"),
        other => panic!("expected StreamDecode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/api/generate", listener.local_addr().unwrap());
    drop(listener);

    let client = client_for(&url);
    let err = client.generate("Hi").await.unwrap_err();

    assert!(matches!(err, GenerationError::Transport(_)));
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn test_silent_service_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/api/generate", listener.local_addr().unwrap());

    // Accept and read, but never answer
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _request = read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let client = GenerationClient::new(GenerationConfig {
        service_url: url,
        timeout: Duration::from_millis(300),
        ..GenerationConfig::default()
    })
    .unwrap();

    let err = client.generate("Hi").await.unwrap_err();
    server.abort();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}
