//! Claim reconstruction judging.
//!
//! Scores how well a reconstruction recovered each ground-truth claim of a
//! document, using one language-model call per document, then derives
//! document and corpus metrics deterministically from the scores.
//!
//! - Prompt construction and a single structured judgment call per document
//! - Score clamping and claim denormalization
//! - Document metrics (means, buckets, per-type and per-importance breakdowns)
//! - Corpus aggregation and Markdown reports
//! - Gemini transport with an explicit retry state machine
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use recon_judge_core::{GeminiClient, InputLoader, JudgeConfig, JudgeService};
//!
//! # async fn example() -> recon_judge_core::JudgeResult<()> {
//! let config = JudgeConfig::from_env();
//! let client = Arc::new(GeminiClient::new(&config)?);
//! let service = JudgeService::new(client);
//!
//! let loader = InputLoader::new("claims", "reconstructions");
//! let claims = loader.load_claims("1976SINGAP02176").await?;
//! let reconstruction = loader.load_reconstruction("1976SINGAP02176").await?;
//!
//! let output = service.judge(&claims.claims, &reconstruction).await?;
//! println!("weighted: {:.2}", output.calculated_metrics.weighted_average_score);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod judge;
pub mod metrics;
pub mod model;
pub mod providers;
pub mod report;
pub mod storage;

// Re-export main types
pub use aggregate::aggregate;
pub use config::{JudgeConfig, Pricing, UnmatchedClaimPolicy, API_KEY_ENV};
pub use error::{InputKind, JudgeError, JudgeResult};
pub use judge::batch::{run_batch, BatchSummary, DocumentFailure, OutputSink};
pub use judge::JudgeService;
pub use metrics::{calculate_metrics, Bucket};
pub use model::{
    AggregateGroupStats, AggregateStats, AnsweredQuestion, CalculatedMetrics, Claim,
    ClaimEvaluation, ClaimsRecord, DocumentSummary, GroupStats, JudgeMetadata, JudgeOutput,
    OverallStats, ReconstructionRecord,
};
pub use providers::llm::fake::FakeClient;
pub use providers::llm::gemini::GeminiClient;
pub use providers::llm::{LlmClient, LlmResponse};
pub use providers::retry::RetryPolicy;
pub use report::{render_aggregate, render_document};
pub use storage::{InputLoader, OutputStore};
