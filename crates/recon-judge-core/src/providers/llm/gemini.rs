//! Gemini `generateContent` client.
//!
//! This is the ONLY place for status code handling; callers see `LlmResponse`
//! or a `JudgeError`.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{LlmClient, LlmResponse};
use crate::config::{JudgeConfig, Pricing};
use crate::error::{JudgeError, JudgeResult};
use crate::providers::retry::{transition, FailureClass, RetryEvent, RetryPolicy, RetryState};

const USER_AGENT_VALUE: &str = concat!("recon-judge/", env!("CARGO_PKG_VERSION"));

/// Longest error body excerpt kept in failure messages.
const ERROR_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
    max_output_tokens: u32,
    retry: RetryPolicy,
    pricing: Pricing,
}

/// One failed attempt, before retry bookkeeping.
#[derive(Debug, Clone)]
struct AttemptFailure {
    class: FailureClass,
    status: Option<u16>,
    message: String,
}

impl AttemptFailure {
    fn from_reqwest(err: &reqwest::Error) -> Self {
        let class = if err.is_timeout() {
            FailureClass::Timeout
        } else if err.is_decode() {
            FailureClass::Malformed
        } else {
            FailureClass::Transport
        };
        Self {
            class,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    fn malformed(message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Malformed,
            status: None,
            message: message.into(),
        }
    }

    fn into_error(self, attempts: u32) -> JudgeError {
        match self.class {
            FailureClass::Malformed => JudgeError::MalformedOutput {
                message: self.message,
            },
            _ => JudgeError::Invocation {
                attempts,
                status: self.status,
                message: self.message,
            },
        }
    }
}

impl GeminiClient {
    /// Build a client; fails with a configuration error when the credential is absent.
    pub fn new(config: &JudgeConfig) -> JudgeResult<Self> {
        let api_key = config.require_api_key()?.to_string();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| {
                JudgeError::configuration(format!("failed to create HTTP client: {}", e))
            })?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            retry: config.retry.clone(),
            pricing: config.pricing,
        })
    }

    fn request_body(&self, system: &str, prompt: &str) -> Value {
        json!({
            "system_instruction": {
                "parts": [{ "text": system }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
                "temperature": self.temperature,
                "responseMimeType": "application/json"
            }
        })
    }

    async fn attempt_once(&self, body: &Value) -> Result<LlmResponse, AttemptFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptFailure::from_reqwest(&e))?;

        let status = response.status().as_u16();
        if let Some(class) = FailureClass::from_status(status) {
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(ERROR_EXCERPT_CHARS).collect();
            return Err(AttemptFailure {
                class,
                status: Some(status),
                message: format!("Gemini API error (status {}): {}", status, excerpt),
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| AttemptFailure::from_reqwest(&e))?;

        parse_generate_response(&envelope, &self.model, &self.pricing)
            .map_err(AttemptFailure::malformed)
    }
}

/// Extract text and usage from a `generateContent` response envelope.
///
/// Parts flagged as `thought` are excluded from the text.
pub(crate) fn parse_generate_response(
    envelope: &Value,
    model: &str,
    pricing: &Pricing,
) -> Result<LlmResponse, String> {
    let parts = envelope
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            match envelope
                .pointer("/promptFeedback/blockReason")
                .and_then(Value::as_str)
            {
                Some(reason) => format!("Gemini response blocked: {}", reason),
                None => "Gemini response missing candidates[0].content.parts".to_string(),
            }
        })?;

    let text: String = parts
        .iter()
        .filter(|p| !p.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    let usage = |key: &str| {
        envelope
            .pointer(&format!("/usageMetadata/{}", key))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    };
    let prompt_tokens = usage("promptTokenCount");
    let completion_tokens = usage("candidatesTokenCount");
    let total_tokens = match usage("totalTokenCount") {
        0 => prompt_tokens + completion_tokens,
        n => n,
    };

    Ok(LlmResponse {
        text,
        provider: "gemini".to_string(),
        model: model.to_string(),
        prompt_tokens,
        completion_tokens,
        total_tokens,
        cost_usd: pricing.cost_usd(prompt_tokens, completion_tokens),
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, system: &str, prompt: &str) -> JudgeResult<LlmResponse> {
        let body = self.request_body(system, prompt);

        let mut state = transition(RetryState::Idle, RetryEvent::Start, &self.retry);
        let mut last_failure: Option<AttemptFailure> = None;
        let mut response: Option<LlmResponse> = None;

        loop {
            state = match state {
                RetryState::Idle => transition(state, RetryEvent::Start, &self.retry),

                RetryState::Attempting { attempt } => match self.attempt_once(&body).await {
                    Ok(resp) => {
                        debug!(
                            attempt,
                            total_tokens = resp.total_tokens,
                            "judgment call succeeded"
                        );
                        response = Some(resp);
                        transition(state, RetryEvent::Succeeded, &self.retry)
                    }
                    Err(failure) => {
                        warn!(
                            attempt,
                            class = ?failure.class,
                            status = ?failure.status,
                            error = %failure.message,
                            "judgment attempt failed"
                        );
                        let class = failure.class;
                        last_failure = Some(failure);
                        transition(state, RetryEvent::Failed(class), &self.retry)
                    }
                },

                RetryState::Backoff { attempt, delay } => {
                    let sleep_for = self.retry.jittered(delay, &mut rand::thread_rng());
                    warn!(
                        retry = attempt,
                        max_retries = self.retry.max_retries,
                        backoff_ms = sleep_for.as_millis() as u64,
                        "retrying judgment call"
                    );
                    tokio::time::sleep(sleep_for).await;
                    transition(state, RetryEvent::BackoffElapsed, &self.retry)
                }

                RetryState::Success { attempts } => {
                    return response.ok_or_else(|| JudgeError::Invocation {
                        attempts,
                        status: None,
                        message: "no response recorded".to_string(),
                    });
                }

                RetryState::Exhausted { attempts } => {
                    return Err(last_failure
                        .unwrap_or_else(|| AttemptFailure {
                            class: FailureClass::Transport,
                            status: None,
                            message: "Gemini request failed".to_string(),
                        })
                        .into_error(attempts));
                }
            };
        }
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_api_key() {
        let cfg = JudgeConfig::default();
        let err = GeminiClient::new(&cfg).unwrap_err();
        assert!(matches!(err, JudgeError::Configuration { .. }));
    }

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let cfg = JudgeConfig::default()
            .with_api_key("k")
            .with_base_url("http://localhost:9999/v1beta/");
        let client = GeminiClient::new(&cfg).unwrap();
        assert_eq!(
            client.endpoint,
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn parse_skips_thought_parts_and_computes_cost() {
        let envelope = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "{\"evaluations\":" },
                        { "text": "[]}" }
                    ]
                }
            }],
            "usageMetadata": {
                "promptTokenCount": 2_000_000,
                "candidatesTokenCount": 1_000_000,
                "totalTokenCount": 3_100_000
            }
        });
        let resp =
            parse_generate_response(&envelope, "gemini-2.5-flash", &Pricing::default()).unwrap();
        assert_eq!(resp.text, "{\"evaluations\":[]}");
        assert_eq!(resp.total_tokens, 3_100_000);
        assert!((resp.cost_usd - 0.9).abs() < 1e-9);
    }

    #[test]
    fn parse_falls_back_to_summed_tokens() {
        let envelope = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5 }
        });
        let resp = parse_generate_response(&envelope, "m", &Pricing::default()).unwrap();
        assert_eq!(resp.total_tokens, 15);
    }

    #[test]
    fn parse_reports_block_reason() {
        let envelope = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = parse_generate_response(&envelope, "m", &Pricing::default()).unwrap_err();
        assert!(err.contains("SAFETY"));
    }
}
