use std::future::Future;

use tracing::info;

use crate::{
    clients::anthropic::AnthropicClient,
    error::AgentError,
    sink::{OutputSink, StdoutSink},
};

pub const PROMPT_INSTRUCTION: &str =
    "Generate a video script, title, description, and marketing copy from the following text:\n";

/// Turns extracted document text into marketing content.
pub trait Generate: Send + Sync {
    fn generate(&self, text: &str) -> impl Future<Output = Result<(), AgentError>> + Send;
}

pub fn build_prompt(text: &str) -> String {
    format!("{PROMPT_INSTRUCTION}{text}")
}

pub struct ContentGenerator<S = StdoutSink> {
    client: AnthropicClient,
    sink: S,
}

impl ContentGenerator<StdoutSink> {
    pub fn new(client: AnthropicClient) -> Self {
        Self::with_sink(client, StdoutSink)
    }
}

impl<S: OutputSink> ContentGenerator<S> {
    pub fn with_sink(client: AnthropicClient, sink: S) -> Self {
        Self { client, sink }
    }
}

impl<S: OutputSink> Generate for ContentGenerator<S> {
    async fn generate(&self, text: &str) -> Result<(), AgentError> {
        let prompt = build_prompt(text);
        let content = self.client.create_message(&prompt).await?;

        info!(
            model = %self.client.model(),
            text_len = text.len(),
            response_len = content.text.len(),
            "content generated"
        );

        self.sink.emit(&content);
        Ok(())
    }
}
