//! LLM client trait — the abstraction over language-model backends.
//!
//! A client knows how to send a conversation to a model and get a reply
//! back, either as a complete message or as a stream of chunks. Transport
//! and provider-specific details live entirely behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use crate::error::ProviderError;
use crate::message::Message;
use crate::usage::Usage;

/// A complete reply from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The aggregated reply text
    pub content: String,

    /// Usage consumed by this call alone
    #[serde(default)]
    pub usage: Usage,
}

/// A single chunk in a streaming reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Usage info (typically only in the final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl StreamChunk {
    /// A content delta.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            done: false,
            usage: None,
        }
    }

    /// The terminating chunk carrying the call's usage.
    pub fn finished(usage: Usage) -> Self {
        Self {
            content: None,
            done: true,
            usage: Some(usage),
        }
    }
}

/// Receiving half of a streamed reply.
pub type ChunkReceiver = mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>;

/// The core LLM client trait.
///
/// The orchestrator calls `chat()` or `chat_stream()` without knowing which
/// backend answers. Implementations shared across concurrent runs must be
/// safe for concurrent invocation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// A human-readable name for this client (e.g., "mock").
    fn name(&self) -> &str;

    /// Send an ordered conversation and get a complete reply.
    async fn chat(&self, messages: &[Message]) -> std::result::Result<ChatResponse, ProviderError>;

    /// Send an ordered conversation and get the reply as chunks.
    ///
    /// Each content chunk is delivered before the final `done` chunk that
    /// carries usage. Default implementation calls `chat()` and wraps the
    /// result as one content chunk followed by the terminator.
    async fn chat_stream(
        &self,
        messages: &[Message],
    ) -> std::result::Result<ChunkReceiver, ProviderError> {
        let response = self.chat(messages).await?;
        let (tx, rx) = mpsc::channel(2);
        let _ = tx.send(Ok(StreamChunk::text(response.content))).await;
        let _ = tx.send(Ok(StreamChunk::finished(response.usage))).await;
        Ok(rx)
    }
}
