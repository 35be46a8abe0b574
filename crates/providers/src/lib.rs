//! Language-model client implementations for Baton.
//!
//! All clients implement the `baton_core::LlmClient` trait. Real transports
//! are supplied by the embedding application; this crate ships the
//! scripted [`MockLlm`] used by tests and the offline CLI.

pub mod mock;

pub use mock::{MockLlm, TokenCost};
