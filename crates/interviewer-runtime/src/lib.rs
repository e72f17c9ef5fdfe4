//! # interviewer-runtime
//!
//! Async interview engine with language-service assisted classification.
//!
//! The deterministic parts of an interview (catalog, validators, state,
//! router, transcript) live in `interviewer-core`. This crate adds:
//! - The step handlers and the turn loop that drives them
//! - A language service contract for translation, classification and wording
//! - A failure-bounded adapter: timeouts, per-purpose circuit breakers and
//!   safe defaults, so no language service failure ever aborts a turn
//! - An LLM provider abstraction with an Anthropic implementation
//!   (feature `anthropic`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use interviewer_core::InterviewConfig;
//! use interviewer_runtime::{InterviewEngine, ScriptedLanguageService};
//!
//! let config = InterviewConfig::from_yaml_file("exit.yaml")?;
//! let engine = InterviewEngine::builder(config)
//!     .service(Arc::new(ScriptedLanguageService::new()))
//!     .build();
//!
//! let outcome = engine.start().await?;
//! let outcome = engine.handle_message(outcome.state, "I found a role closer to home.").await?;
//! for message in &outcome.messages {
//!     println!("{}", message.content);
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod engine;
pub mod fallback;
pub mod language;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod steps;

pub use adapter::{LanguageAdapter, Translation};
pub use config::{RuntimeConfig, RuntimeConfigError};
pub use engine::{EngineError, InterviewEngine, InterviewEngineBuilder, TurnOutcome, TurnStatus};
pub use language::{
    LanguageService, ProviderLanguageService, Purpose, ScriptedLanguageService, ScriptedReply,
    ServiceError,
};
pub use providers::{Completion, CompletionConfig, LlmProvider, Prompt, ProviderError};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig};

#[cfg(feature = "anthropic")]
pub use providers::AnthropicProvider;
