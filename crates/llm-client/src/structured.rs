use serde::de::DeserializeOwned;

use crate::json::parse_lenient;
use crate::provider::ChatProvider;
use crate::types::ChatRequest;
use crate::{LlmError, Result};

// ─── Options ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StructuredOptions {
    /// Rounds of request → parse → validate (minimum 1).
    pub max_attempts: u32,
    pub temperature: Option<f32>,
    pub json_mode: bool,
    /// Builds the text appended to the user prompt after a failed round,
    /// given the failure reason.
    pub retry_suffix: fn(&str) -> String,
}

fn default_retry_suffix(error: &str) -> String {
    format!(
        "\n\nYour previous response was not valid ({error}). \
         Respond with ONLY the JSON object, nothing else."
    )
}

impl Default for StructuredOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            temperature: None,
            json_mode: true,
            retry_suffix: default_retry_suffix,
        }
    }
}

// ─── Result ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Structured<R> {
    pub value: R,
    /// 1-based round that produced `value`.
    pub attempts: u32,
}

// ─── Loop ─────────────────────────────────────────────────────────────────

/// Ask `provider` for a JSON document, deserialize it leniently as `T`, and
/// convert it with `validate`. Parse and validation failures are retried with
/// the failure reason fed back to the model; after `max_attempts` failed
/// rounds the last reason is returned in [`LlmError::InvalidStructuredOutput`].
///
/// Transport errors end the loop immediately: the provider is responsible
/// for its own transport retries.
pub async fn request_structured<T, R, F>(
    provider: &dyn ChatProvider,
    system: &str,
    user: &str,
    opts: &StructuredOptions,
    mut validate: F,
) -> Result<Structured<R>>
where
    T: DeserializeOwned,
    F: FnMut(T) -> std::result::Result<R, String>,
{
    let max_attempts = opts.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        let user_prompt = if attempt == 1 {
            user.to_string()
        } else {
            format!("{user}{}", (opts.retry_suffix)(&last_error))
        };
        let request = ChatRequest {
            system: system.to_string(),
            user: user_prompt,
            temperature: opts.temperature,
            json_mode: opts.json_mode,
        };

        let text = provider.complete(&request).await?;

        let outcome = parse_lenient::<T>(&text).and_then(&mut validate);
        match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "structured output accepted after retry");
                }
                return Ok(Structured {
                    value,
                    attempts: attempt,
                });
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    "model output rejected"
                );
                last_error = e;
            }
        }
    }

    Err(LlmError::InvalidStructuredOutput {
        attempts: max_attempts,
        last_error,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Score {
        score: i32,
    }

    fn in_range(s: Score) -> std::result::Result<i32, String> {
        if (0..=10).contains(&s.score) {
            Ok(s.score)
        } else {
            Err(format!("score {} out of range", s.score))
        }
    }

    #[tokio::test]
    async fn first_valid_answer_wins() {
        let provider = ScriptedProvider::new(["{\"score\": 7}"]);
        let out = request_structured(&provider, "sys", "user", &StructuredOptions::default(), in_range)
            .await
            .unwrap();
        assert_eq!(out.value, 7);
        assert_eq!(out.attempts, 1);
        assert_eq!(provider.requests().len(), 1);
        assert!(provider.requests()[0].json_mode);
    }

    #[tokio::test]
    async fn retries_feed_back_the_failure() {
        let provider = ScriptedProvider::new([
            "lo siento, aquí va: score = 7",
            "{\"score\": 42}",
            "```json\n{\"score\": 3,}\n```",
        ]);
        let out = request_structured(&provider, "sys", "user", &StructuredOptions::default(), in_range)
            .await
            .unwrap();
        assert_eq!(out.value, 3);
        assert_eq!(out.attempts, 3);

        let reqs = provider.requests();
        assert_eq!(reqs[0].user, "user");
        assert!(reqs[1].user.starts_with("user\n\nYour previous response was not valid"));
        assert!(reqs[2].user.contains("score 42 out of range"));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let provider = ScriptedProvider::new(["nope", "{\"score\": 11}", "still no"]);
        let opts = StructuredOptions {
            max_attempts: 2,
            ..Default::default()
        };
        let err = request_structured(&provider, "s", "u", &opts, in_range)
            .await
            .unwrap_err();
        match err {
            LlmError::InvalidStructuredOutput {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("score 11"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn transport_errors_are_not_retried_here() {
        let provider = ScriptedProvider::failing(LlmError::Api {
            status: 401,
            message: "bad key".into(),
        });
        let err = request_structured(&provider, "s", "u", &StructuredOptions::default(), in_range)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 401, .. }));
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn custom_retry_suffix_is_used() {
        fn spanish(e: &str) -> String {
            format!(" [reintento: {e}]")
        }
        let provider = ScriptedProvider::new(["x", "{\"score\": 1}"]);
        let opts = StructuredOptions {
            retry_suffix: spanish,
            temperature: Some(0.2),
            ..Default::default()
        };
        request_structured(&provider, "s", "u", &opts, in_range)
            .await
            .unwrap();
        let reqs = provider.requests();
        assert!(reqs[1].user.starts_with("u [reintento: "));
        assert_eq!(reqs[1].temperature, Some(0.2));
    }
}
