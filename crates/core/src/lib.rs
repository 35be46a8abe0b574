//! # Baton Core
//!
//! Domain types, traits, and error definitions for the Baton agent
//! orchestrator. This crate has **no runtime wiring** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (language-model client, tool, planner,
//! memory store) is a trait here. Implementations live in their respective
//! crates or are supplied by the caller, which keeps tests on mock
//! implementations and keeps the dependency graph pointing inward.

pub mod error;
pub mod message;
pub mod usage;
pub mod provider;
pub mod tool;
pub mod memory;
pub mod agent;

// Re-export key types at crate root for ergonomics
pub use error::{ArgumentError, Error, MemoryError, PlanError, ProviderError, Result, ToolError};
pub use message::{Message, Role};
pub use usage::{Budget, Usage, budget_exceeded};
pub use provider::{ChatResponse, ChunkReceiver, LlmClient, StreamChunk};
pub use tool::{SAFE_COMMANDS, Tool, ToolCall, ToolContext, ToolOutput, ToolRegistry};
pub use memory::{DEFAULT_SEARCH_LIMIT, MemoryItem, MemoryStore};
pub use agent::{AgentStep, Planner, ToolUsed};
