//! Groq chat-completions client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{CompletionClient, CompletionRequest, EnhanceOptions};

/// Default Groq endpoint (OpenAI compatible).
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Blocking client for Groq's `/chat/completions`.
#[derive(Clone)]
pub struct GroqClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl GroqClient {
    /// Build a client from enhancement options.
    pub fn new(options: &EnhanceOptions) -> Result<Self> {
        if options.api_key.trim().is_empty() {
            return Err(Error::MissingCredential);
        }

        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_base: options.api_base.trim_end_matches('/').to_string(),
            api_key: options.api_key.clone(),
            model: options.model.clone(),
        })
    }

    /// Full URL of the completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

/// Pull the first choice's content out of a response body.
pub(crate) fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| Error::Enhance("response has no completion text".to_string()))
}

impl CompletionClient for GroqClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            let detail = text.lines().next().unwrap_or_default();
            return Err(Error::Enhance(format!("{}: {}", status, detail)));
        }

        parse_completion(&text)
    }
}
