//! Chat-completion layer for stockline
//!
//! This crate provides the small slice of LLM functionality the bot needs to
//! turn collected market data into a narrative report:
//!
//! - Message types for a chat conversation
//! - Completion request/response types
//! - The [`LLMProvider`] trait implemented by concrete backends
//! - An OpenAI (and OpenAI-compatible) chat-completions provider

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
