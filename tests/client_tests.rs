// ABOUTME: Tests for the reqwest MastodonClient against a mock HTTP server
// ABOUTME: Covers bearer auth, status posting, error statuses, and SSE timeline streaming

use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_stream::StreamExt;
use tootbot::mastodon::{ApiError, MastodonApi, MastodonClient, PostStatus, StreamEvent};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn status_json(id: &str, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "content": content,
        "visibility": "public",
        "account": {"id": "7", "username": "bob", "acct": "bob", "display_name": "Bob"}
    })
}

#[tokio::test]
async fn test_verify_credentials_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/verify_credentials"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1",
            "username": "alice",
            "acct": "alice",
            "display_name": "Alice"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MastodonClient::new(&server.uri(), "tok-1").unwrap();
    let account = client.verify_credentials().await.unwrap();
    assert_eq!(account.acct, "alice");
    assert_eq!(account.display_name, "Alice");
}

#[tokio::test]
async fn test_verify_credentials_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/verify_credentials"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "The access token is invalid"})),
        )
        .mount(&server)
        .await;

    let client = MastodonClient::new(&server.uri(), "bad").unwrap();
    let err = client.verify_credentials().await.unwrap_err();
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Status { status, body }) => {
            assert_eq!(*status, 401);
            assert!(body.contains("invalid"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_post_status_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/statuses"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({
            "status": "@bob hi",
            "visibility": "unlisted",
            "in_reply_to_id": "42"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_json("43", "<p>@bob hi</p>")))
        .expect(1)
        .mount(&server)
        .await;

    let client = MastodonClient::new(&server.uri(), "tok-1").unwrap();
    let posted = client
        .post_status(&PostStatus::new("@bob hi", "unlisted").in_reply_to("42"))
        .await
        .unwrap();
    assert_eq!(posted.id, "43");
    assert_eq!(posted.raw, status_json("43", "<p>@bob hi</p>"));
}

#[tokio::test]
async fn test_post_status_without_reply_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/statuses"))
        .and(body_json(json!({"status": "hello", "visibility": "public"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_json("5", "<p>hello</p>")))
        .expect(1)
        .mount(&server)
        .await;

    let client = MastodonClient::new(&server.uri(), "tok-1").unwrap();
    client
        .post_status(&PostStatus::new("hello", "public"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_post_status_server_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/statuses"))
        .respond_with(ResponseTemplate::new(422).set_body_string("Validation failed"))
        .mount(&server)
        .await;

    let client = MastodonClient::new(&server.uri(), "tok-1").unwrap();
    let err = client
        .post_status(&PostStatus::new("hello", "nonsense"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("422"));
    assert!(err.to_string().contains("Validation failed"));
}

#[tokio::test]
async fn test_stream_yields_updates_in_order() {
    let server = MockServer::start().await;
    let body = format!(
        ":thump\n\nevent: update\ndata: {}\n\nevent: delete\ndata: 99\n\nevent: update\ndata: {}\n\nevent: update\ndata: garbage\n\n",
        status_json("1", "<p>first</p>"),
        status_json("2", "<p>second</p>"),
    );
    Mock::given(method("GET"))
        .and(path("/api/v1/streaming/public/local"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("accept", "text/event-stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = MastodonClient::new(&server.uri(), "tok-1").unwrap();
    let stream = client.stream("/api/v1/streaming/public/local").await.unwrap();
    let events: Vec<StreamEvent> = stream.collect().await;

    assert_eq!(events.len(), 3);
    match (&events[0], &events[1]) {
        (StreamEvent::Update(a), StreamEvent::Update(b)) => {
            assert_eq!(a.id, "1");
            assert_eq!(b.id, "2");
            assert_eq!(b.content, "<p>second</p>");
            assert_eq!(a.raw, status_json("1", "<p>first</p>"));
        }
        other => panic!("expected two updates, got {:?}", other),
    }
    assert!(matches!(events[2], StreamEvent::Error(_)));
}

#[tokio::test]
async fn test_stream_rejected_subscription() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/streaming/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = MastodonClient::new(&server.uri(), "tok-1").unwrap();
    let err = client.stream("/api/v1/streaming/user").await.err().unwrap();
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Status { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_dropping_stream_closes_quiet_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // serves one heartbeat, then holds the connection open until the client hangs up
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await.unwrap();
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n8\r\n:thump\n\n\r\n",
            )
            .await
            .unwrap();
        let mut rest = [0u8; 256];
        loop {
            match socket.read(&mut rest).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    });

    let client = MastodonClient::new(&format!("http://{}", addr), "tok-1").unwrap();
    let stream = client.stream("/api/v1/streaming/public").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(stream);

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("connection still open after the stream was dropped")
        .unwrap();
}
