use async_trait::async_trait;
use tracing::{error, info, warn};

use super::JudgeService;
use crate::error::{JudgeError, JudgeResult};
use crate::model::JudgeOutput;
use crate::report::render_document;
use crate::storage::{InputLoader, OutputStore};

/// Receives each judgment as soon as it completes.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn accept(&self, output: &JudgeOutput) -> JudgeResult<()>;
}

#[async_trait]
impl OutputSink for OutputStore {
    async fn accept(&self, output: &JudgeOutput) -> JudgeResult<()> {
        self.write_document(output, &render_document(output)).await
    }
}

#[derive(Debug)]
pub struct DocumentFailure {
    pub doc_id: String,
    pub error: JudgeError,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outputs: Vec<JudgeOutput>,
    pub failures: Vec<DocumentFailure>,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
}

impl BatchSummary {
    pub fn requested(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }

    /// True when documents were requested and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.outputs.is_empty() && !self.failures.is_empty()
    }
}

/// Judge `doc_ids` in order, one at a time.
///
/// Per-document failures are recorded and the run continues; a fatal error
/// (configuration, output I/O) aborts the run and is returned.
pub async fn run_batch(
    service: &JudgeService,
    loader: &InputLoader,
    doc_ids: &[String],
    sink: &dyn OutputSink,
) -> JudgeResult<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (i, doc_id) in doc_ids.iter().enumerate() {
        info!(doc_id = %doc_id, position = i + 1, total = doc_ids.len(), "evaluating");

        match judge_one(service, loader, doc_id).await {
            Ok(output) => {
                sink.accept(&output).await?;
                summary.total_tokens += output.metadata.total_tokens;
                summary.total_cost_usd += output.metadata.cost_usd;
                summary.outputs.push(output);
            }
            Err(e) if e.is_fatal() => {
                error!(doc_id = %doc_id, error = %e, "aborting run");
                return Err(e);
            }
            Err(e) => {
                warn!(doc_id = %doc_id, error = %e, "document skipped");
                summary.failures.push(DocumentFailure {
                    doc_id: doc_id.clone(),
                    error: e,
                });
            }
        }
    }

    info!(
        succeeded = summary.outputs.len(),
        failed = summary.failures.len(),
        total_tokens = summary.total_tokens,
        total_cost_usd = summary.total_cost_usd,
        "batch complete"
    );
    Ok(summary)
}

async fn judge_one(
    service: &JudgeService,
    loader: &InputLoader,
    doc_id: &str,
) -> JudgeResult<JudgeOutput> {
    let claims = loader.load_claims(doc_id).await?;
    let reconstruction = loader.load_reconstruction(doc_id).await?;
    service.judge(&claims.claims, &reconstruction).await
}
