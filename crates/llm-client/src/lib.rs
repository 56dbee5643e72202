//! `llm-client` — async client for OpenAI-compatible model endpoints, plus
//! the machinery for turning free-text model answers into validated,
//! strongly typed values.
//!
//! # Architecture
//!
//! ```text
//! request_structured(provider, system, user, opts, validate)
//!     │   up to max_attempts rounds; failure reason fed back to the model
//!     ▼
//! ChatProvider::complete   ← LlmClient: POST /v1/chat/completions
//!     │                       transport retries with exponential backoff
//!     ▼
//! json::parse_lenient      ← exact → extracted object → repaired object
//!     │
//!     ▼
//! validate(T) -> R         ← caller's domain checks
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use llm_client::{request_structured, LlmClient, StructuredOptions};
//!
//! let client = LlmClient::new("https://api.openai.com", "gpt-4o-mini", key, timeout)?;
//! let out = request_structured::<MyRaw, MyValue, _>(
//!     &client, system, user, &StructuredOptions::default(), |raw| raw.check(),
//! ).await?;
//! ```

pub mod client;
pub mod error;
pub mod json;
pub mod provider;
pub mod structured;
pub mod testing;
pub mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use provider::{ChatProvider, SpeechProvider};
pub use structured::{request_structured, Structured, StructuredOptions};
pub use types::ChatRequest;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, LlmError>;
