use async_trait::async_trait;

use crate::types::ChatRequest;
use crate::Result;

/// A chat completion backend. Object safe so callers can hold
/// `Arc<dyn ChatProvider>` and swap in a fake for tests.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Return the assistant's text for a single exchange.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;

    /// Model identifier recorded alongside results.
    fn model(&self) -> &str;
}

/// A text-to-speech backend.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Audio bytes (mp3) narrating `text`.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
