use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmClient, LlmResponse};
use crate::error::{JudgeError, JudgeResult};

/// Scripted client for offline runs and tests. Replies are served in order;
/// every call's prompt is recorded.
#[derive(Debug)]
pub struct FakeClient {
    model: String,
    replies: Mutex<VecDeque<JudgeResult<String>>>,
    tokens_per_call: u64,
    cost_per_call: f64,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            replies: Mutex::new(VecDeque::new()),
            tokens_per_call: 0,
            cost_per_call: 0.0,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn with_error(self, error: JudgeError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn with_usage(mut self, tokens: u64, cost_usd: f64) -> Self {
        self.tokens_per_call = tokens;
        self.cost_per_call = cost_usd;
        self
    }

    fn push(&self, reply: JudgeResult<String>) {
        self.replies
            .lock()
            .expect("fake client replies poisoned")
            .push_back(reply);
    }

    /// `(system, prompt)` pairs seen so far.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts
            .lock()
            .expect("fake client prompts poisoned")
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, system: &str, prompt: &str) -> JudgeResult<LlmResponse> {
        self.prompts
            .lock()
            .expect("fake client prompts poisoned")
            .push((system.to_string(), prompt.to_string()));

        let reply = self
            .replies
            .lock()
            .expect("fake client replies poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(JudgeError::Invocation {
                    attempts: 1,
                    status: None,
                    message: "fake client has no scripted replies left".to_string(),
                })
            })?;

        Ok(LlmResponse {
            text: reply,
            provider: "fake".to_string(),
            model: self.model.clone(),
            prompt_tokens: self.tokens_per_call,
            completion_tokens: 0,
            total_tokens: self.tokens_per_call,
            cost_usd: self.cost_per_call,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
