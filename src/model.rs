use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ChatMessage, Role};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream reply had no content")]
    EmptyReply,
}

// Whatever produces the assistant's next message
pub trait ChatModel: Send + Sync {
    fn complete<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
    ) -> BoxFuture<'a, Result<String, ModelError>>;
}

// Any /chat/completions compatible provider (OpenAI, Mistral, local servers)
pub struct OpenAiCompatible {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<&'a ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatible {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    async fn call(
        &self,
        system_prompt: Option<&str>,
        messages: &[ChatMessage],
    ) -> Result<String, ModelError> {
        let system = system_prompt.map(|p| ChatMessage {
            role: Role::System,
            content: p.to_string(),
        });
        let body = CompletionRequest {
            model: &self.model,
            messages: system.iter().chain(messages.iter()).collect(),
            stream: false,
        };

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = res.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ModelError::EmptyReply)
    }
}

impl ChatModel for OpenAiCompatible {
    fn complete<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        messages: &'a [ChatMessage],
    ) -> BoxFuture<'a, Result<String, ModelError>> {
        Box::pin(self.call(system_prompt, messages))
    }
}
