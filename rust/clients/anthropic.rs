use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::AgentError;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Response of one messages call: the untouched JSON body plus its text blocks.
#[derive(Clone, Debug)]
pub struct GeneratedContent {
    pub raw: Value,
    pub text: String,
}

pub struct AnthropicClient {
    http: Client,
    config: ProviderConfig,
}

impl AnthropicClient {
    pub fn new(config: ProviderConfig) -> Result<Self, AgentError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends `prompt` as the single user message. The credential is checked here,
    /// not at construction, so a missing key only fails the first generation.
    pub async fn create_message(&self, prompt: &str) -> Result<GeneratedContent, AgentError> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            AgentError::Authentication("ANTHROPIC_API_KEY is not set".to_string())
        })?;

        let url = self.messages_url();
        let body = MessagesRequest::new(&self.config.model, self.config.max_tokens, prompt);
        debug!(url = %url, model = %self.config.model, prompt_len = prompt.len(), "sending messages request");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("failed to call {url}: {e}")))?;

        let raw = ensure_success(response)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| AgentError::Provider(format!("failed to decode messages response: {e}")))?;

        GeneratedContent::from_raw(raw)
    }

    fn messages_url(&self) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), MESSAGES_PATH)
    }
}

impl GeneratedContent {
    fn from_raw(raw: Value) -> Result<Self, AgentError> {
        let parsed = MessagesResponse::deserialize(&raw)
            .map_err(|e| AgentError::Provider(format!("malformed messages response: {e}")))?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<String>();

        Ok(Self { raw, text })
    }
}

async fn ensure_success(response: Response) -> Result<Response, AgentError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AgentError::Authentication(format!("{status}: {message}"))
        }
        _ => AgentError::Provider(format!("messages endpoint returned {status}: {message}")),
    })
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

impl<'a> MessagesRequest<'a> {
    fn new(model: &'a str, max_tokens: u32, prompt: &'a str) -> Self {
        Self {
            model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
