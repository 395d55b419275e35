mod common;

use std::time::Duration;

use chat_gateway::model::{ChatModel, ModelError, OpenAiCompatible};
use chat_gateway::models::{ChatMessage, Role};

fn user(content: &str) -> Vec<ChatMessage> {
    vec![ChatMessage {
        role: Role::User,
        content: content.to_string(),
    }]
}

#[tokio::test]
async fn posts_chat_completion_with_system_prompt() {
    let (url, received) = common::start_mock_backend(
        200,
        r#"{"choices":[{"message":{"role":"assistant","content":"Ciao!"}}]}"#,
    )
    .await;

    let model = OpenAiCompatible::new(
        &format!("{}/", url),
        "gpt-4.1",
        Some("sk-test".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();

    let reply = model.complete(Some("Be brief."), &user("hello")).await.unwrap();
    assert_eq!(reply, "Ciao!");

    let raw = received.lock().unwrap()[0].clone();
    assert!(raw.starts_with("POST /chat/completions "));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    let body: serde_json::Value = serde_json::from_str(raw.split("\r\n\r\n").nth(1).unwrap()).unwrap();
    assert_eq!(body["model"], "gpt-4.1");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "Be brief.");
    assert_eq!(body["messages"][1]["content"], "hello");
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
    let (url, _) = common::start_mock_backend(500, r#"{"error":"boom"}"#).await;
    let model = OpenAiCompatible::new(&url, "m", None, Duration::from_secs(5)).unwrap();

    match model.complete(None, &user("hi")).await {
        Err(ModelError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn empty_choices_are_an_error() {
    let (url, _) = common::start_mock_backend(200, r#"{"choices":[]}"#).await;
    let model = OpenAiCompatible::new(&url, "m", None, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        model.complete(None, &user("hi")).await,
        Err(ModelError::EmptyReply)
    ));
}
