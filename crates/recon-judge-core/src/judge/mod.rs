//! Per-document judging.
//!
//! Responsibility boundaries:
//! - prompt.rs: system prompt and user prompt rendering only
//! - client.rs: model call + structured parse boundary
//! - mapper.rs: reconcile raw scores against the claim list
//! - batch.rs: sequential multi-document runs

pub mod batch;
pub mod client;
pub mod mapper;
pub mod prompt;

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::UnmatchedClaimPolicy;
use crate::error::JudgeResult;
use crate::metrics::calculate_metrics;
use crate::model::{Claim, JudgeMetadata, JudgeOutput, ReconstructionRecord};
use crate::providers::llm::LlmClient;
use client::{invoke_structured, RawJudgeOutput};

#[derive(Clone)]
pub struct JudgeService {
    client: Arc<dyn LlmClient>,
    unmatched_claims: UnmatchedClaimPolicy,
}

impl JudgeService {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            unmatched_claims: UnmatchedClaimPolicy::default(),
        }
    }

    pub fn with_unmatched_policy(mut self, policy: UnmatchedClaimPolicy) -> Self {
        self.unmatched_claims = policy;
        self
    }

    /// Judge one document with exactly one model invocation.
    pub async fn judge(
        &self,
        claims: &[Claim],
        reconstruction: &ReconstructionRecord,
    ) -> JudgeResult<JudgeOutput> {
        let user_prompt = prompt::build_user_prompt(claims, reconstruction);

        let judgment = invoke_structured::<RawJudgeOutput>(
            self.client.as_ref(),
            prompt::SYSTEM_PROMPT,
            &user_prompt,
        )
        .await?;

        let claim_evaluations =
            mapper::map_evaluations(claims, judgment.data.evaluations, self.unmatched_claims)?;
        let calculated_metrics = calculate_metrics(&claim_evaluations);

        info!(
            doc_id = %reconstruction.doc_id,
            evaluated = claim_evaluations.len(),
            claims = claims.len(),
            average = calculated_metrics.average_score,
            weighted = calculated_metrics.weighted_average_score,
            "document judged"
        );

        Ok(JudgeOutput {
            doc_id: reconstruction.doc_id.clone(),
            timestamp: Utc::now(),
            claim_evaluations,
            calculated_metrics,
            metadata: JudgeMetadata {
                model: judgment.model,
                total_tokens: judgment.total_tokens,
                cost_usd: judgment.cost_usd,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JudgeError;
    use crate::model::{
        AnsweredQuestion, Confidence, QuestionStyle, ReconstructionMetadata, ReconstructionStats,
        TimeBounds,
    };
    use crate::providers::llm::fake::FakeClient;

    fn claims() -> Vec<Claim> {
        [("c1", 5u8), ("c2", 3), ("c3", 1)]
            .iter()
            .map(|(id, importance)| Claim {
                claim_id: id.to_string(),
                claim_text: format!("claim {}", id),
                claim_type: "fact".to_string(),
                entities: vec![],
                time_bounds: TimeBounds::default(),
                importance: *importance,
            })
            .collect()
    }

    fn reconstruction() -> ReconstructionRecord {
        ReconstructionRecord {
            doc_id: "doc-1".to_string(),
            timestamp: None,
            answered_questions: vec![AnsweredQuestion {
                question_id: "q1".to_string(),
                question_text: "What happened?".to_string(),
                question_style: QuestionStyle::Contextual,
                answer: Some("Something".to_string()),
                confidence: Confidence::Medium,
                supporting_evidence: vec![],
                reasoning: String::new(),
            }],
            synthesis: "Summary".to_string(),
            stats: ReconstructionStats::default(),
            metadata: ReconstructionMetadata::default(),
        }
    }

    #[tokio::test]
    async fn scenario_scores_and_metadata() {
        let client = Arc::new(
            FakeClient::new("fake-judge")
                .with_response(
                    r#"{"evaluations": [
                        {"claim_id": "c1", "score": 10, "justification": "exact", "evidence_refs": ["q1"]},
                        {"claim_id": "c2", "score": 5, "justification": "partial", "evidence_refs": []},
                        {"claim_id": "c3", "score": 0, "justification": "absent", "evidence_refs": []}
                    ]}"#,
                )
                .with_usage(900, 0.0012),
        );
        let svc = JudgeService::new(client.clone());

        let out = svc.judge(&claims(), &reconstruction()).await.unwrap();

        assert_eq!(client.calls(), 1);
        assert_eq!(out.doc_id, "doc-1");
        assert_eq!(out.calculated_metrics.average_score, 5.0);
        assert!((out.calculated_metrics.weighted_average_score - 65.0 / 9.0).abs() < 1e-12);
        assert_eq!(out.metadata.model, "fake-judge");
        assert_eq!(out.metadata.total_tokens, 900);

        let (system, prompt) = &client.prompts()[0];
        assert_eq!(system, prompt::SYSTEM_PROMPT);
        assert!(prompt.contains("[c3] (fact, importance: 1)"));
    }

    #[tokio::test]
    async fn clamps_and_tolerates_unknown_ids() {
        let client = Arc::new(FakeClient::new("fake").with_response(
            r#"{"evaluations": [
                {"claim_id": "c1", "score": 14, "justification": "", "evidence_refs": []},
                {"claim_id": "zz", "score": -3, "justification": "", "evidence_refs": []}
            ]}"#,
        ));
        let out = JudgeService::new(client)
            .judge(&claims(), &reconstruction())
            .await
            .unwrap();

        assert_eq!(out.claim_evaluations[0].score, 10);
        assert_eq!(out.claim_evaluations[1].score, 0);
        assert_eq!(out.claim_evaluations[1].claim_type, "unknown");
        assert_eq!(out.calculated_metrics.total_claims, 2);
    }

    #[tokio::test]
    async fn malformed_output_fails_document() {
        let client = Arc::new(FakeClient::new("fake").with_response("not json at all"));
        let err = JudgeService::new(client)
            .judge(&claims(), &reconstruction())
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn reject_policy_surfaces_unmatched_claim() {
        let client = Arc::new(FakeClient::new("fake").with_response(
            r#"{"evaluations": [{"claim_id": "c42", "score": 3}]}"#,
        ));
        let err = JudgeService::new(client)
            .with_unmatched_policy(UnmatchedClaimPolicy::Reject)
            .judge(&claims(), &reconstruction())
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::UnmatchedClaim { .. }));
    }
}
