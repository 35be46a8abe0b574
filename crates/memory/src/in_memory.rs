//! In-memory store — useful for testing and ephemeral runs.

use async_trait::async_trait;
use baton_core::error::MemoryError;
use baton_core::memory::{MemoryItem, MemoryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Score for a query found in an item's content.
const CONTENT_MATCH: f32 = 1.0;
/// Score for a query found in any of an item's tags.
const TAG_MATCH: f32 = 0.5;

/// An in-memory store that keeps items in insertion order.
///
/// Search is a case-insensitive substring match: content hits outrank tag
/// hits, and ties keep insertion order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    items: Arc<RwLock<Vec<MemoryItem>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    fn score(item: &MemoryItem, query_lower: &str) -> f32 {
        let mut score = 0.0;
        if item.content.to_lowercase().contains(query_lower) {
            score += CONTENT_MATCH;
        }
        if item.tags.iter().any(|t| t.to_lowercase().contains(query_lower)) {
            score += TAG_MATCH;
        }
        score
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str { "in_memory" }

    async fn put(&self, item: MemoryItem) -> Result<(), MemoryError> {
        self.items.write().await.push(item);
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<MemoryItem>, MemoryError> {
        let items = self.items.read().await;
        let query_lower = query.to_lowercase();

        let mut scored: Vec<(f32, &MemoryItem)> = items
            .iter()
            .map(|item| (Self::score(item, &query_lower), item))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Stable, so equal scores stay in insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored.into_iter().take(k).map(|(_, item)| item.clone()).collect())
    }
}
