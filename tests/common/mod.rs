//! Shared helpers for the router-level tests.
#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use chat_gateway::app::build_router;
use chat_gateway::model::{BoxFuture, ChatModel, ModelError};
use chat_gateway::models::ChatMessage;
use chat_gateway::origin::AllowedOrigins;
use chat_gateway::rate_limit::{RateLimitConfig, RateLimiter};
use chat_gateway::session::SessionCodec;
use chat_gateway::state::AppState;

pub const ACCESS_CODE: &str = "GLITCH2025";
pub const SECRET: &str = "integration-secret";
pub const ORIGIN: &str = "http://localhost:3000";

/// Model stub that echoes the last message and remembers what it was sent.
#[derive(Default)]
pub struct EchoModel {
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
    pub fail: bool,
}

impl ChatModel for EchoModel {
    fn complete<'a>(
        &'a self,
        _system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
    ) -> BoxFuture<'a, Result<String, ModelError>> {
        Box::pin(async move {
            self.seen.lock().unwrap().push(messages.to_vec());
            if self.fail {
                return Err(ModelError::EmptyReply);
            }
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(format!("echo: {}", last))
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub model: Arc<EchoModel>,
    pub limiter: Arc<RateLimiter>,
    pub codec: Arc<SessionCodec>,
}

pub fn test_app(limit: u32, model: EchoModel) -> TestApp {
    let model = Arc::new(model);
    let limiter = Arc::new(RateLimiter::new());
    let codec = Arc::new(SessionCodec::new(
        ACCESS_CODE,
        SECRET,
        Duration::from_secs(24 * 60 * 60),
    ));

    let state = Arc::new(AppState {
        sessions: codec.clone(),
        rate_limiter: limiter.clone(),
        rate_config: RateLimitConfig {
            limit,
            window_ms: 60_000,
        },
        rate_limit_by_ip: false,
        allowed_origins: AllowedOrigins::from_list("localhost,chat.example.com"),
        model: model.clone(),
        system_prompt: Some("You are a test.".to_string()),
        max_message_chars: 3500,
    });

    TestApp {
        router: build_router(state),
        model,
        limiter,
        codec,
    }
}

pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("origin", ORIGIN)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Start a one-endpoint HTTP server that answers every request with `status`
/// and `body`, returning its base url and the raw requests it received.
pub async fn start_mock_backend(
    status: u16,
    body: &'static str,
) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let log = log.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 64 * 1024];
                let mut read = 0;
                // read until headers plus declared body have arrived
                loop {
                    let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read += n;
                    let text = String::from_utf8_lossy(&buf[..read]);
                    if let Some(split) = text.find("\r\n\r\n") {
                        let content_length = text[..split]
                            .lines()
                            .find_map(|l| {
                                let (k, v) = l.split_once(':')?;
                                k.eq_ignore_ascii_case("content-length")
                                    .then(|| v.trim().parse::<usize>().ok())
                                    .flatten()
                            })
                            .unwrap_or(0);
                        if read >= split + 4 + content_length {
                            break;
                        }
                    }
                }
                log.lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&buf[..read]).into_owned());

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), received)
}
