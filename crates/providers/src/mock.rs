//! Scripted language-model client.
//!
//! Replies come from a queue of canned responses (falling back to `"OK"`),
//! or from a fixed chunk list when streamed. Token usage is estimated at
//! one token per four characters and priced with an optional per-token
//! cost, so budget behaviour can be exercised without a network.

use async_trait::async_trait;
use baton_core::error::ProviderError;
use baton_core::message::Message;
use baton_core::provider::{ChatResponse, ChunkReceiver, LlmClient, StreamChunk};
use baton_core::usage::Usage;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Reply used once the scripted responses run out.
pub const FALLBACK_REPLY: &str = "OK";

/// USD charged per prompt and per completion token.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TokenCost {
    pub prompt: f64,
    pub completion: f64,
}

/// A mock client that replays scripted replies.
#[derive(Default)]
pub struct MockLlm {
    responses: Mutex<VecDeque<String>>,
    stream_chunks: Option<Vec<String>>,
    token_cost: TokenCost,
    failure: Option<ProviderError>,
    calls: AtomicUsize,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies returned by successive non-streamed calls.
    pub fn with_responses(mut self, responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.responses = Mutex::new(responses.into_iter().map(Into::into).collect());
        self
    }

    /// Chunks emitted, in order, by every streamed call.
    pub fn with_stream_chunks(mut self, chunks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stream_chunks = Some(chunks.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_token_cost(mut self, prompt: f64, completion: f64) -> Self {
        self.token_cost = TokenCost { prompt, completion };
        self
    }

    /// Make every call fail with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Number of chat calls served so far, streamed or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn estimate_tokens(text: &str) -> u64 {
        text.chars().count().div_ceil(4) as u64
    }

    fn usage_for(&self, messages: &[Message], content: &str) -> Usage {
        let prompt_tokens: u64 = messages.iter().map(|m| Self::estimate_tokens(&m.content)).sum();
        let completion_tokens = Self::estimate_tokens(content);
        let usd = self.token_cost.prompt * prompt_tokens as f64
            + self.token_cost.completion * completion_tokens as f64;
        Usage::new(prompt_tokens, completion_tokens, usd)
    }

    fn begin_call(&self) -> Result<usize, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(call),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, messages: &[Message]) -> Result<ChatResponse, ProviderError> {
        let call = self.begin_call()?;
        let content = self
            .responses
            .lock()
            .map_err(|_| ProviderError::Request("mock response queue poisoned".into()))?
            .pop_front()
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        let usage = self.usage_for(messages, &content);
        debug!(call, prompt_tokens = usage.prompt_tokens, completion_tokens = usage.completion_tokens, "Mock chat");
        Ok(ChatResponse { content, usage })
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ChunkReceiver, ProviderError> {
        let Some(chunks) = &self.stream_chunks else {
            let response = self.chat(messages).await?;
            let (tx, rx) = mpsc::channel(2);
            let _ = tx.send(Ok(StreamChunk::text(response.content))).await;
            let _ = tx.send(Ok(StreamChunk::finished(response.usage))).await;
            return Ok(rx);
        };

        let call = self.begin_call()?;
        let content: String = chunks.concat();
        let usage = self.usage_for(messages, &content);
        debug!(call, chunks = chunks.len(), "Mock stream");

        let (tx, rx) = mpsc::channel(chunks.len() + 1);
        for chunk in chunks {
            let _ = tx.send(Ok(StreamChunk::text(chunk.clone()))).await;
        }
        let _ = tx.send(Ok(StreamChunk::finished(usage))).await;
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convo() -> Vec<Message> {
        // 24 chars -> 6 tokens, 4 chars -> 1 token
        vec![Message::system("You are an orchestrator."), Message::user("Test")]
    }

    #[tokio::test]
    async fn replays_responses_then_falls_back() {
        let llm = MockLlm::new().with_responses(["first", "second"]);
        assert_eq!(llm.chat(&convo()).await.unwrap().content, "first");
        assert_eq!(llm.chat(&convo()).await.unwrap().content, "second");
        assert_eq!(llm.chat(&convo()).await.unwrap().content, FALLBACK_REPLY);
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn usage_is_estimated_and_priced_per_call() {
        let llm = MockLlm::new()
            .with_responses(["Final answer."])
            .with_token_cost(0.5, 1.0);
        let usage = llm.chat(&convo()).await.unwrap().usage;
        assert_eq!(usage.prompt_tokens, 7);
        assert_eq!(usage.completion_tokens, 4);
        assert!((usage.usd - 7.5).abs() < 1e-12);

        // Second call reports its own delta, not a running total.
        let again = llm.chat(&convo()).await.unwrap().usage;
        assert_eq!(again.prompt_tokens, 7);
        assert_eq!(again.completion_tokens, 1);
    }

    #[tokio::test]
    async fn streams_chunks_in_order_then_usage() {
        let llm = MockLlm::new().with_stream_chunks(["A", "B", "C"]);
        let mut rx = llm.chat_stream(&convo()).await.unwrap();

        let mut text = String::new();
        let mut usage = None;
        while let Some(chunk) = rx.recv().await {
            let chunk = chunk.unwrap();
            if let Some(c) = chunk.content {
                text.push_str(&c);
            }
            if chunk.done {
                usage = chunk.usage;
            }
        }
        assert_eq!(text, "ABC");
        assert_eq!(usage.unwrap().completion_tokens, 1);
    }

    #[tokio::test]
    async fn stream_without_chunks_uses_scripted_reply() {
        let llm = MockLlm::new().with_responses(["whole"]);
        let mut rx = llm.chat_stream(&convo()).await.unwrap();
        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.content.as_deref(), Some("whole"));
        assert!(rx.recv().await.unwrap().unwrap().done);
    }

    #[tokio::test]
    async fn failing_client_errors_every_call() {
        let llm = MockLlm::failing(ProviderError::Request("down".into()));
        assert!(llm.chat(&convo()).await.is_err());
        assert!(llm.chat_stream(&convo()).await.is_err());
        assert_eq!(llm.calls(), 2);
    }
}
