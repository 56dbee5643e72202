use std::time::Duration;

use async_trait::async_trait;

use crate::provider::{ChatProvider, SpeechProvider};
use crate::types::{
    ChatRequest, CompletionBody, CompletionResponse, ErrorBody, ResponseFormat, SpeechBody,
    WireMessage,
};
use crate::{LlmError, Result};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

// ─── LlmClient ────────────────────────────────────────────────────────────

/// HTTP client for any endpoint speaking the OpenAI chat completions and
/// audio speech protocols (OpenAI, Ollama, vLLM, LM Studio, …).
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    speech_model: String,
    voice: String,
    max_retries: u32,
    backoff: Duration,
}

impl LlmClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        tracing::info!(model, base_url = %base_url, "LLM client configured");

        Ok(Self {
            http,
            base_url,
            model: model.to_string(),
            api_key,
            speech_model: "tts-1".to_string(),
            voice: "nova".to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
        })
    }

    pub fn with_speech(mut self, model: &str, voice: &str) -> Self {
        self.speech_model = model.to_string();
        self.voice = voice.to_string();
        self
    }

    /// Base delay; attempt `n` waits `backoff * 2^(n-1)`.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent.
    async fn with_retries<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff * 2u32.pow(attempt - 1);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "{what} failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn send_completion(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = CompletionBody {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            response_format: request
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
            stream: false,
        };

        let response = self
            .authorized(self.http.post(&url))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: CompletionResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    async fn send_speech(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/v1/audio/speech", self.base_url);
        let body = SpeechBody {
            model: &self.speech_model,
            input: text,
            voice: &self.voice,
            response_format: "mp3",
        };
        let response = self
            .authorized(self.http.post(&url))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(bytes.to_vec())
    }
}

/// Turn a non-2xx response into [`LlmError::Api`] carrying the provider's
/// own error message when it sent one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|e| e.message())
        .unwrap_or(body);
    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ChatProvider for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.with_retries("chat completion", || self.send_completion(request))
            .await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SpeechProvider for LlmClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(LlmError::Unsupported("cannot narrate empty text".into()));
        }
        self.with_retries("speech synthesis", || self.send_speech(text))
            .await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(url: &str) -> LlmClient {
        LlmClient::new(url, "test-model", Some("sk-test".into()), Duration::from_secs(5))
            .unwrap()
            .with_backoff(Duration::ZERO)
    }

    fn completion(text: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn complete_returns_assistant_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "response_format": { "type": "json_object" },
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "hola" }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("{\"ok\":true}"))
            .create_async()
            .await;

        let mut req = ChatRequest::new("sys", "hola");
        req.json_mode = true;
        let text = client(&server.url()).complete(&req).await.unwrap();
        assert_eq!(text, "{\"ok\":true}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body(r#"{"error":{"message":"overloaded"}}"#)
            .expect(3)
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(&ChatRequest::new("s", "u"))
            .await
            .unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limits_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let limited = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"slow down"}}"#)
            .expect(3)
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(&ChatRequest::new("s", "u"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 429, .. }));
        limited.assert_async().await;
    }

    #[tokio::test]
    async fn retry_recovers_after_transient_failure() {
        let mut server = mockito::Server::new_async().await;
        let overloaded = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body(r#"{"error":{"message":"overloaded"}}"#)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("listo"))
            .expect(1)
            .create_async()
            .await;

        let text = client(&server.url())
            .complete(&ChatRequest::new("s", "u"))
            .await
            .unwrap();
        assert_eq!(text, "listo");
        overloaded.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn refused_connections_are_retried() {
        // Bind then release a port so nothing is listening on it.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let c = client(&format!("http://{addr}"));
        let request = ChatRequest::new("s", "u");

        let calls = std::sync::atomic::AtomicU32::new(0);
        let err = c
            .with_retries("chat completion", || {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                c.send_completion(&request)
            })
            .await
            .unwrap_err();
        assert!(matches!(&err, LlmError::Http(e) if e.is_connect()), "{err:?}");
        assert!(err.is_retryable());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), DEFAULT_MAX_RETRIES);
    }

    #[tokio::test]
    async fn client_errors_fail_fast() {
        let mut server = mockito::Server::new_async().await;
        let unauthorized = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"invalid api key"}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(&ChatRequest::new("s", "u"))
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("invalid api key"));
        unauthorized.assert_async().await;
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(completion("   "))
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(&ChatRequest::new("s", "u"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn synthesize_posts_voice_and_returns_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/audio/speech")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "tts-1",
                "voice": "alloy",
                "input": "Hola, ¿qué tal?"
            })))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(vec![0xff, 0xf3, 0x44])
            .create_async()
            .await;

        let audio = client(&server.url())
            .with_speech("tts-1", "alloy")
            .synthesize("Hola, ¿qué tal?")
            .await
            .unwrap();
        assert_eq!(audio, vec![0xff, 0xf3, 0x44]);
        mock.assert_async().await;
    }

    #[test]
    fn base_url_is_trimmed() {
        let c = LlmClient::new("http://localhost:11434/", "m", None, Duration::from_secs(1))
            .unwrap();
        assert_eq!(c.base_url(), "http://localhost:11434");
    }
}
