//! Corpus-level rollup over many per-document outputs.

use crate::metrics::{tally, ScoreTally};
use crate::model::{AggregateGroupStats, AggregateStats, DocumentSummary, JudgeOutput, OverallStats};

fn group(t: &ScoreTally) -> AggregateGroupStats {
    AggregateGroupStats {
        count: t.count,
        average_score: t.mean(),
        pct_reconstructed: t.pct(t.full),
    }
}

/// Aggregate outputs in the order given. `by_document` keeps input order;
/// sorting is left to the presentation layer.
///
/// Zero documents yield an all-zero result.
pub fn aggregate(outputs: &[JudgeOutput]) -> AggregateStats {
    if outputs.is_empty() {
        return AggregateStats::default();
    }

    let (overall, by_type, by_importance) =
        tally(outputs.iter().flat_map(|o| o.claim_evaluations.iter()));

    AggregateStats {
        total_documents: outputs.len(),
        total_claims: overall.count,
        overall: OverallStats {
            average_score: overall.mean(),
            weighted_average_score: overall.weighted_mean(),
            pct_fully_reconstructed: overall.pct(overall.full),
            pct_partially_reconstructed: overall.pct(overall.partial),
            pct_not_reconstructed: overall.pct(overall.none),
        },
        by_claim_type: by_type.iter().map(|(k, t)| (k.clone(), group(t))).collect(),
        by_importance: by_importance.iter().map(|(k, t)| (*k, group(t))).collect(),
        by_document: outputs
            .iter()
            .map(|o| DocumentSummary {
                doc_id: o.doc_id.clone(),
                claim_count: o.calculated_metrics.total_claims,
                average_score: o.calculated_metrics.average_score,
                weighted_average_score: o.calculated_metrics.weighted_average_score,
            })
            .collect(),
    }
}
