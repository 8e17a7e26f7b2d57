use crate::config::Config;
use crate::secrets::ApiKey;
use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a summarization request failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("API key rejected: {0}")]
    Unauthorized(String),

    #[error("rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("response contained no summary")]
    EmptyResponse,
}

/// Turns bill text into a summary
pub trait Summarizer {
    fn summarize(&self, bill_text: &str) -> Result<String, SummarizeError>;
}

impl<S: Summarizer + ?Sized> Summarizer for &S {
    fn summarize(&self, bill_text: &str) -> Result<String, SummarizeError> {
        (**self).summarize(bill_text)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Summarizer backed by an OpenAI-compatible chat-completion endpoint
pub struct OpenAiSummarizer {
    client: Client,
    endpoint: String,
    model: String,
    system_prompt: String,
    api_key: ApiKey,
}

impl OpenAiSummarizer {
    pub fn new(config: &Config, api_key: ApiKey) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SummarizeError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            api_key,
        })
    }

    fn request_body<'a>(&'a self, bill_text: &str) -> ChatRequest<'a> {
        build_request(&self.model, &self.system_prompt, bill_text)
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, bill_text: &str) -> Result<String, SummarizeError> {
        info!(
            "requesting summary from {} ({} chars of bill text)",
            self.model,
            bill_text.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&self.request_body(bill_text))
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().map_err(transport_error)?;
        debug!("chat completion returned {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        parse_completion(&body)
    }
}

fn build_request<'a>(model: &'a str, system_prompt: &'a str, bill_text: &str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system_prompt.to_string(),
            },
            ChatMessage {
                role: "user",
                content: format!("Summarize this bill: {}", bill_text),
            },
        ],
    }
}

fn transport_error(e: reqwest::Error) -> SummarizeError {
    if e.is_timeout() {
        SummarizeError::Timeout
    } else {
        SummarizeError::Network(e.to_string())
    }
}

/// Classify a non-success HTTP status
pub fn status_error(status: u16, body: &str) -> SummarizeError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| truncate(body.trim(), 320));

    match status {
        401 | 403 => SummarizeError::Unauthorized(message),
        429 => SummarizeError::RateLimited(message),
        _ => SummarizeError::Api { status, message },
    }
}

/// Extract the first choice's text from a chat-completion response body
pub fn parse_completion(body: &str) -> Result<String, SummarizeError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(SummarizeError::EmptyResponse);
    }
    Ok(content)
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
