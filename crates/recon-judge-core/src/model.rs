//! Record types shared with the extraction and reconstruction stages, plus the
//! judge's own output records.
//!
//! Field names are the wire contract and must not be renamed.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Stage 1 (claim extraction) ---

/// Output of the claim extraction stage for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsRecord {
    pub doc_id: String,

    #[serde(default)]
    pub doc_subject: Option<String>,

    #[serde(default)]
    pub doc_date: Option<String>,

    pub claims: Vec<Claim>,

    #[serde(default)]
    pub questions: Vec<Question>,

    #[serde(default)]
    pub metadata: ExtractionMetadata,
}

/// A ground-truth statement extracted from the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub claim_text: String,
    pub claim_type: String,

    #[serde(default)]
    pub entities: Vec<String>,

    #[serde(default)]
    pub time_bounds: TimeBounds,

    /// Importance level, 1 (minor) to 5 (central).
    pub importance: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,

    #[serde(default)]
    pub targets_claim_id: Option<String>,

    #[serde(default)]
    pub targets_claim_ids: Vec<String>,

    pub question_text: String,
    pub question_style: QuestionStyle,

    #[serde(default)]
    pub answer_type: Option<String>,

    #[serde(default)]
    pub leakage_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStyle {
    Targeted,
    Contextual,
    Thematic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    #[serde(default)]
    pub extraction_timestamp: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub cost_usd: f64,
}

// --- Stage 2 (reconstruction) ---

/// Output of the reconstruction stage for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionRecord {
    pub doc_id: String,

    #[serde(default)]
    pub timestamp: Option<String>,

    pub answered_questions: Vec<AnsweredQuestion>,

    #[serde(default)]
    pub synthesis: String,

    #[serde(default)]
    pub stats: ReconstructionStats,

    #[serde(default)]
    pub metadata: ReconstructionMetadata,
}

/// One reconstruction answer to a probing question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question_id: String,
    pub question_text: String,
    pub question_style: QuestionStyle,

    /// `None` when the analyst could not answer.
    #[serde(default)]
    pub answer: Option<String>,

    pub confidence: Confidence,

    #[serde(default)]
    pub supporting_evidence: Vec<Evidence>,

    #[serde(default)]
    pub reasoning: String,
}

impl AnsweredQuestion {
    /// The answer text, treating an empty string the same as no answer.
    pub fn answer_text(&self) -> Option<&str> {
        self.answer.as_deref().filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub doc_rank: u32,
    pub doc_id: String,
    pub quote: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconstructionStats {
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub answered_high_confidence: u32,
    #[serde(default)]
    pub answered_medium_confidence: u32,
    #[serde(default)]
    pub answered_low_confidence: u32,
    #[serde(default)]
    pub unable_to_answer: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconstructionMetadata {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub cost_usd: f64,
    #[serde(default)]
    pub retrieved_doc_count: u32,
}

// --- Stage 3 (judge) ---

/// Judgment for one claim. Claim fields are copied in so consumers never
/// re-join against the claim list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimEvaluation {
    pub claim_id: String,
    pub claim_text: String,
    pub claim_type: String,
    pub importance: u8,

    /// Always within 0..=10.
    pub score: u8,

    #[serde(default)]
    pub justification: String,

    #[serde(default)]
    pub evidence_refs: Vec<String>,
}

/// Count and mean score for one group of evaluations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: usize,
    pub average_score: f64,
}

/// Document-level metrics, always derived from `claim_evaluations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatedMetrics {
    pub total_claims: usize,
    pub average_score: f64,
    pub weighted_average_score: f64,

    /// score >= 8
    pub fully_reconstructed: usize,
    /// 4 <= score < 8
    pub partially_reconstructed: usize,
    /// score < 4
    pub not_reconstructed: usize,

    pub by_type: BTreeMap<String, GroupStats>,
    pub by_importance: BTreeMap<u8, GroupStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeMetadata {
    pub model: String,
    pub total_tokens: u64,
    pub cost_usd: f64,
}

/// Complete judge result for one document; the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeOutput {
    pub doc_id: String,
    pub timestamp: DateTime<Utc>,
    pub claim_evaluations: Vec<ClaimEvaluation>,
    pub calculated_metrics: CalculatedMetrics,
    pub metadata: JudgeMetadata,
}

// --- Corpus level ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub average_score: f64,
    pub weighted_average_score: f64,
    pub pct_fully_reconstructed: f64,
    pub pct_partially_reconstructed: f64,
    pub pct_not_reconstructed: f64,
}

/// Group stats plus the share of the group scoring 8 or more.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateGroupStats {
    pub count: usize,
    pub average_score: f64,
    pub pct_reconstructed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub doc_id: String,
    pub claim_count: usize,
    pub average_score: f64,
    pub weighted_average_score: f64,
}

/// Cross-document rollup, recomputed from the full set of outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_documents: usize,
    pub total_claims: usize,
    pub overall: OverallStats,
    pub by_claim_type: BTreeMap<String, AggregateGroupStats>,
    pub by_importance: BTreeMap<u8, AggregateGroupStats>,
    pub by_document: Vec<DocumentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstruction_record_parses_null_answer() {
        let raw = r#"{
            "doc_id": "d1",
            "answered_questions": [{
                "question_id": "q1",
                "question_text": "Who signed the accord?",
                "question_style": "targeted",
                "answer": null,
                "confidence": "none",
                "supporting_evidence": [],
                "reasoning": "No related documents mention it."
            }],
            "synthesis": "",
            "stats": {"total_questions": 1, "unable_to_answer": 1},
            "metadata": {"model": "m", "total_tokens": 10, "cost_usd": 0.0, "retrieved_doc_count": 3}
        }"#;
        let rec: ReconstructionRecord = serde_json::from_str(raw).unwrap();
        let q = &rec.answered_questions[0];
        assert_eq!(q.answer_text(), None);
        assert_eq!(q.confidence, Confidence::None);
        assert_eq!(rec.stats.unable_to_answer, 1);
    }

    #[test]
    fn empty_answer_counts_as_absent() {
        let q = AnsweredQuestion {
            question_id: "q1".to_string(),
            question_text: "t".to_string(),
            question_style: QuestionStyle::Thematic,
            answer: Some(String::new()),
            confidence: Confidence::Low,
            supporting_evidence: vec![],
            reasoning: String::new(),
        };
        assert_eq!(q.answer_text(), None);
    }

    #[test]
    fn by_importance_keys_round_trip_as_strings() {
        let mut metrics = CalculatedMetrics::default();
        metrics.by_importance.insert(
            5,
            GroupStats {
                count: 2,
                average_score: 7.5,
            },
        );
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["by_importance"]["5"]["count"], 2);

        let back: CalculatedMetrics = serde_json::from_value(json).unwrap();
        assert_eq!(back, metrics);
    }

    #[test]
    fn claims_record_tolerates_missing_optional_fields() {
        let raw = r#"{
            "doc_id": "d1",
            "claims": [{
                "claim_id": "c1",
                "claim_text": "The embassy reported a cabinet reshuffle.",
                "claim_type": "event",
                "importance": 4
            }]
        }"#;
        let rec: ClaimsRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.claims[0].time_bounds, TimeBounds::default());
        assert!(rec.questions.is_empty());
    }
}
