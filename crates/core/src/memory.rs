//! Memory trait — a simple keyed knowledge store.
//!
//! The agent loop itself never reads or writes memory; the store is part of
//! the run's input surface and is handed to tools via `ToolContext`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::MemoryError;

/// Number of results returned by a search when the caller does not say.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// A single memory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// Caller-chosen key
    pub key: String,

    /// The content of the memory
    pub content: String,

    /// Tags for categorization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl MemoryItem {
    pub fn new(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// The core MemoryStore trait.
///
/// Implementations shared across concurrent runs must be safe for
/// concurrent invocation.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Store a new item.
    async fn put(&self, item: MemoryItem) -> std::result::Result<(), MemoryError>;

    /// Return the top-`k` items matching `query`, best first.
    async fn search(&self, query: &str, k: usize) -> std::result::Result<Vec<MemoryItem>, MemoryError>;
}
