use proptest::prelude::*;
use recon_judge_core::judge::mapper::clamp_score;
use recon_judge_core::{aggregate, calculate_metrics, ClaimEvaluation};

fn evaluation(score: u8, importance: u8, ty: usize) -> ClaimEvaluation {
    ClaimEvaluation {
        claim_id: format!("c-{}-{}", score, importance),
        claim_text: String::new(),
        claim_type: ["fact", "event", "relationship"][ty].to_string(),
        importance,
        score,
        justification: String::new(),
        evidence_refs: vec![],
    }
}

fn evaluations() -> impl Strategy<Value = Vec<ClaimEvaluation>> {
    prop::collection::vec((0u8..=10, 1u8..=5, 0usize..3), 0..40)
        .prop_map(|v| v.into_iter().map(|(s, i, t)| evaluation(s, i, t)).collect())
}

proptest! {
    #[test]
    fn buckets_partition_the_claims(evals in evaluations()) {
        let m = calculate_metrics(&evals);
        prop_assert_eq!(
            m.fully_reconstructed + m.partially_reconstructed + m.not_reconstructed,
            m.total_claims
        );
        prop_assert_eq!(m.total_claims, evals.len());
        let by_type: usize = m.by_type.values().map(|g| g.count).sum();
        let by_importance: usize = m.by_importance.values().map(|g| g.count).sum();
        prop_assert_eq!(by_type, evals.len());
        prop_assert_eq!(by_importance, evals.len());
    }

    #[test]
    fn means_stay_within_score_range(evals in evaluations()) {
        let m = calculate_metrics(&evals);
        prop_assert!((0.0..=10.0).contains(&m.average_score));
        prop_assert!((0.0..=10.0).contains(&m.weighted_average_score));
    }

    #[test]
    fn equal_importance_weighted_mean_is_the_mean(
        scores in prop::collection::vec(0u8..=10, 1..30),
        importance in 1u8..=5,
    ) {
        let evals: Vec<_> = scores.iter().map(|s| evaluation(*s, importance, 0)).collect();
        let m = calculate_metrics(&evals);
        prop_assert_eq!(m.weighted_average_score, m.average_score);
    }

    #[test]
    fn clamp_always_lands_in_range(raw in prop::num::f64::ANY) {
        let s = clamp_score(raw);
        prop_assert!(s <= 10);
    }

    #[test]
    fn aggregate_percentages_sum_to_hundred(evals in evaluations()) {
        prop_assume!(!evals.is_empty());
        let output = recon_judge_core::JudgeOutput {
            doc_id: "d".to_string(),
            timestamp: chrono::Utc::now(),
            calculated_metrics: calculate_metrics(&evals),
            claim_evaluations: evals,
            metadata: recon_judge_core::JudgeMetadata {
                model: "m".to_string(),
                total_tokens: 0,
                cost_usd: 0.0,
            },
        };
        let stats = aggregate(std::slice::from_ref(&output));
        let o = &stats.overall;
        let total = o.pct_fully_reconstructed + o.pct_partially_reconstructed + o.pct_not_reconstructed;
        prop_assert!((total - 100.0).abs() < 1e-9);
    }
}
