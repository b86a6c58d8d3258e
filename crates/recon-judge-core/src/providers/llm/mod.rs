pub mod fake;
pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::JudgeResult;

/// Raw completion plus usage accounting for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
}

/// Text-generation capability used by the judge.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a system instruction and a user prompt; retries are the client's concern.
    async fn complete(&self, system: &str, prompt: &str) -> JudgeResult<LlmResponse>;

    fn provider_name(&self) -> &'static str;

    fn model(&self) -> &str;
}
