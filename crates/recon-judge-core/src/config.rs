//! Judge configuration.
//!
//! Built once at startup (YAML file and/or environment) and passed by
//! reference to the client and the judge service.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `GEMINI_API_KEY` | Credential for the judgment model (required for live runs) |
//! | `RECON_JUDGE_MODEL` | Model name (default: `gemini-2.5-flash`) |
//! | `RECON_JUDGE_BASE_URL` | API base URL |
//! | `RECON_JUDGE_TIMEOUT` | Per-attempt request timeout in seconds (default: 180) |
//! | `RECON_JUDGE_MAX_RETRIES` | Retries after the first attempt (default: 3) |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JudgeError, JudgeResult};
use crate::providers::retry::RetryPolicy;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// What to do when the model scores a claim id that is not in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedClaimPolicy {
    /// Keep the evaluation with type "unknown" and importance 1.
    #[default]
    Default,
    /// Fail the document.
    Reject,
}

/// Token pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default = "default_input_price")]
    pub input_per_million: f64,
    #[serde(default = "default_output_price")]
    pub output_per_million: f64,
}

fn default_input_price() -> f64 {
    0.15
}

fn default_output_price() -> f64 {
    0.60
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_per_million: default_input_price(),
            output_per_million: default_output_price(),
        }
    }
}

impl Pricing {
    pub fn cost_usd(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        (prompt_tokens as f64 / 1_000_000.0) * self.input_per_million
            + (completion_tokens as f64 / 1_000_000.0) * self.output_per_million
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Model credential. Never serialized back out.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub pricing: Pricing,

    #[serde(default)]
    pub unmatched_claims: UnmatchedClaimPolicy,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_output_tokens() -> u32 {
    16384
}

fn default_timeout() -> u64 {
    180
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout(),
            retry: RetryPolicy::default(),
            pricing: Pricing::default(),
            unmatched_claims: UnmatchedClaimPolicy::default(),
        }
    }
}

impl JudgeConfig {
    /// Create config from defaults plus environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a YAML config file, then apply environment overrides.
    pub fn load(path: &Path) -> JudgeResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JudgeError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let cfg: Self = serde_yaml::from_str(&raw).map_err(|e| {
            JudgeError::configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;
        Ok(cfg.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = env_non_empty(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(model) = env_non_empty("RECON_JUDGE_MODEL") {
            self.model = model;
        }
        if let Some(url) = env_non_empty("RECON_JUDGE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(timeout) = env_non_empty("RECON_JUDGE_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.timeout_secs = timeout;
        }
        if let Some(retries) =
            env_non_empty("RECON_JUDGE_MAX_RETRIES").and_then(|v| v.parse().ok())
        {
            self.retry.max_retries = retries;
        }
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The credential, or a configuration error naming the missing variable.
    pub fn require_api_key(&self) -> JudgeResult<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                JudgeError::configuration(format!(
                    "{} environment variable is not set",
                    API_KEY_ENV
                ))
            })
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
