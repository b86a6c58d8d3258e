use std::collections::HashMap;

use tracing::warn;

use super::client::RawEvaluation;
use crate::config::UnmatchedClaimPolicy;
use crate::error::{JudgeError, JudgeResult};
use crate::model::{Claim, ClaimEvaluation};

pub const UNKNOWN_CLAIM_TYPE: &str = "unknown";
pub const UNKNOWN_CLAIM_IMPORTANCE: u8 = 1;

pub const MIN_SCORE: u8 = 0;
pub const MAX_SCORE: u8 = 10;

/// Clamp a raw model score into `MIN_SCORE..=MAX_SCORE`, rounding to the nearest integer.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return MIN_SCORE;
    }
    raw.clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)).round() as u8
}

/// One evaluation per raw entry, in model output order.
///
/// Claims the model never mentions get no evaluation; an omitted claim is
/// distinct from one explicitly scored 0.
pub fn map_evaluations(
    claims: &[Claim],
    raw: Vec<RawEvaluation>,
    policy: UnmatchedClaimPolicy,
) -> JudgeResult<Vec<ClaimEvaluation>> {
    let by_id: HashMap<&str, &Claim> = claims.iter().map(|c| (c.claim_id.as_str(), c)).collect();

    raw.into_iter()
        .map(|e| {
            let (claim_text, claim_type, importance) = match by_id.get(e.claim_id.as_str()) {
                Some(c) => (c.claim_text.clone(), c.claim_type.clone(), c.importance),
                None => {
                    if policy == UnmatchedClaimPolicy::Reject {
                        return Err(JudgeError::UnmatchedClaim {
                            claim_id: e.claim_id,
                        });
                    }
                    warn!(claim_id = %e.claim_id, "judge scored a claim id not in the input");
                    (
                        String::new(),
                        UNKNOWN_CLAIM_TYPE.to_string(),
                        UNKNOWN_CLAIM_IMPORTANCE,
                    )
                }
            };

            Ok(ClaimEvaluation {
                claim_id: e.claim_id,
                claim_text,
                claim_type,
                importance,
                score: clamp_score(e.score),
                justification: e.justification,
                evidence_refs: e.evidence_refs,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeBounds;

    fn claim(id: &str, ty: &str, importance: u8) -> Claim {
        Claim {
            claim_id: id.to_string(),
            claim_text: format!("text of {}", id),
            claim_type: ty.to_string(),
            entities: vec!["Singapore".to_string()],
            time_bounds: TimeBounds::default(),
            importance,
        }
    }

    fn raw(id: &str, score: f64) -> RawEvaluation {
        RawEvaluation {
            claim_id: id.to_string(),
            score,
            justification: "because".to_string(),
            evidence_refs: vec!["q1".to_string()],
        }
    }

    #[test]
    fn clamps_out_of_range_scores() {
        assert_eq!(clamp_score(-3.0), 0);
        assert_eq!(clamp_score(14.0), 10);
        assert_eq!(clamp_score(7.4), 7);
        assert_eq!(clamp_score(7.5), 8);
        assert_eq!(clamp_score(f64::NAN), 0);
    }

    #[test]
    fn denormalizes_matched_claims() {
        let claims = vec![claim("c1", "event", 4)];
        let evals =
            map_evaluations(&claims, vec![raw("c1", 9.0)], UnmatchedClaimPolicy::Default).unwrap();
        assert_eq!(evals.len(), 1);
        assert_eq!(evals[0].claim_text, "text of c1");
        assert_eq!(evals[0].claim_type, "event");
        assert_eq!(evals[0].importance, 4);
        assert_eq!(evals[0].score, 9);
        assert_eq!(evals[0].evidence_refs, vec!["q1".to_string()]);
    }

    #[test]
    fn unknown_id_defaults_and_continues() {
        let claims = vec![claim("c1", "fact", 5), claim("c2", "fact", 3)];
        let evals = map_evaluations(
            &claims,
            vec![raw("c1", 8.0), raw("c99", 6.0), raw("c2", 2.0)],
            UnmatchedClaimPolicy::Default,
        )
        .unwrap();
        assert_eq!(evals.len(), 3);
        assert_eq!(evals[1].claim_id, "c99");
        assert_eq!(evals[1].claim_type, "unknown");
        assert_eq!(evals[1].importance, 1);
        assert_eq!(evals[1].claim_text, "");
        assert_eq!(evals[2].claim_type, "fact");
    }

    #[test]
    fn reject_policy_fails_on_unknown_id() {
        let claims = vec![claim("c1", "fact", 5)];
        let err = map_evaluations(&claims, vec![raw("C1", 8.0)], UnmatchedClaimPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, JudgeError::UnmatchedClaim { ref claim_id } if claim_id == "C1"));
    }

    #[test]
    fn omitted_claims_produce_no_record() {
        let claims = vec![claim("c1", "fact", 5), claim("c2", "fact", 3)];
        let evals =
            map_evaluations(&claims, vec![raw("c2", 0.0)], UnmatchedClaimPolicy::Default).unwrap();
        let ids: Vec<&str> = evals.iter().map(|e| e.claim_id.as_str()).collect();
        assert_eq!(ids, vec!["c2"]);
        assert_eq!(evals[0].score, 0);
    }
}
