//! Document-level metrics. Pure functions of the evaluation list.

use std::collections::BTreeMap;

use crate::model::{CalculatedMetrics, ClaimEvaluation, GroupStats};

/// Lowest score counted as fully reconstructed.
pub const FULL_THRESHOLD: u8 = 8;
/// Lowest score counted as partially reconstructed.
pub const PARTIAL_THRESHOLD: u8 = 4;

/// Reconstruction-quality bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Full,
    Partial,
    None,
}

impl Bucket {
    pub fn from_score(score: u8) -> Self {
        if score >= FULL_THRESHOLD {
            Self::Full
        } else if score >= PARTIAL_THRESHOLD {
            Self::Partial
        } else {
            Self::None
        }
    }
}

/// Running sums over a set of evaluations. Sums are kept as integers so
/// equal importances give a weighted mean identical to the plain mean.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScoreTally {
    pub(crate) count: usize,
    score_sum: u64,
    weighted_sum: u64,
    weight_sum: u64,
    pub(crate) full: usize,
    pub(crate) partial: usize,
    pub(crate) none: usize,
}

impl ScoreTally {
    pub(crate) fn add(&mut self, e: &ClaimEvaluation) {
        let score = u64::from(e.score);
        let weight = u64::from(e.importance);
        self.count += 1;
        self.score_sum += score;
        self.weighted_sum += score * weight;
        self.weight_sum += weight;
        match Bucket::from_score(e.score) {
            Bucket::Full => self.full += 1,
            Bucket::Partial => self.partial += 1,
            Bucket::None => self.none += 1,
        }
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.score_sum as f64 / self.count as f64
    }

    /// Falls back to the plain mean when total weight is zero.
    pub(crate) fn weighted_mean(&self) -> f64 {
        if self.weight_sum == 0 {
            return self.mean();
        }
        self.weighted_sum as f64 / self.weight_sum as f64
    }

    /// Percentage of this tally's evaluations that `n` represents.
    pub(crate) fn pct(&self, n: usize) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        n as f64 / self.count as f64 * 100.0
    }

    pub(crate) fn group_stats(&self) -> GroupStats {
        GroupStats {
            count: self.count,
            average_score: self.mean(),
        }
    }
}

/// Tally evaluations overall and grouped by claim type and by importance.
pub(crate) fn tally<'a, I>(
    evaluations: I,
) -> (
    ScoreTally,
    BTreeMap<String, ScoreTally>,
    BTreeMap<u8, ScoreTally>,
)
where
    I: IntoIterator<Item = &'a ClaimEvaluation>,
{
    let mut overall = ScoreTally::default();
    let mut by_type: BTreeMap<String, ScoreTally> = BTreeMap::new();
    let mut by_importance: BTreeMap<u8, ScoreTally> = BTreeMap::new();

    for e in evaluations {
        overall.add(e);
        by_type.entry(e.claim_type.clone()).or_default().add(e);
        by_importance.entry(e.importance).or_default().add(e);
    }

    (overall, by_type, by_importance)
}

/// Compute document metrics from its evaluations.
///
/// Zero evaluations yield all-zero metrics with empty breakdowns.
pub fn calculate_metrics(evaluations: &[ClaimEvaluation]) -> CalculatedMetrics {
    let (overall, by_type, by_importance) = tally(evaluations);

    CalculatedMetrics {
        total_claims: overall.count,
        average_score: overall.mean(),
        weighted_average_score: overall.weighted_mean(),
        fully_reconstructed: overall.full,
        partially_reconstructed: overall.partial,
        not_reconstructed: overall.none,
        by_type: by_type
            .into_iter()
            .map(|(k, t)| (k, t.group_stats()))
            .collect(),
        by_importance: by_importance
            .into_iter()
            .map(|(k, t)| (k, t.group_stats()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(id: &str, ty: &str, importance: u8, score: u8) -> ClaimEvaluation {
        ClaimEvaluation {
            claim_id: id.to_string(),
            claim_text: String::new(),
            claim_type: ty.to_string(),
            importance,
            score,
            justification: String::new(),
            evidence_refs: vec![],
        }
    }

    #[test]
    fn empty_is_all_zero() {
        let m = calculate_metrics(&[]);
        assert_eq!(m, CalculatedMetrics::default());
        assert!(m.by_type.is_empty());
        assert!(m.by_importance.is_empty());
    }

    #[test]
    fn three_claim_scenario() {
        let evals = vec![
            eval("c1", "fact", 5, 10),
            eval("c2", "event", 3, 5),
            eval("c3", "fact", 1, 0),
        ];
        let m = calculate_metrics(&evals);
        assert_eq!(m.total_claims, 3);
        assert_eq!(m.average_score, 5.0);
        assert!((m.weighted_average_score - 65.0 / 9.0).abs() < 1e-12);
        assert_eq!(
            (
                m.fully_reconstructed,
                m.partially_reconstructed,
                m.not_reconstructed
            ),
            (1, 1, 1)
        );
        assert_eq!(m.by_type["fact"].count, 2);
        assert_eq!(m.by_type["fact"].average_score, 5.0);
        assert_eq!(m.by_type["event"].average_score, 5.0);
        assert_eq!(m.by_importance[&5].average_score, 10.0);
        assert_eq!(m.by_importance[&1].count, 1);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(Bucket::from_score(8), Bucket::Full);
        assert_eq!(Bucket::from_score(7), Bucket::Partial);
        assert_eq!(Bucket::from_score(4), Bucket::Partial);
        assert_eq!(Bucket::from_score(3), Bucket::None);
        assert_eq!(Bucket::from_score(0), Bucket::None);
    }

    #[test]
    fn equal_importance_weighted_equals_mean() {
        let evals = vec![
            eval("a", "fact", 3, 7),
            eval("b", "fact", 3, 2),
            eval("c", "fact", 3, 9),
        ];
        let m = calculate_metrics(&evals);
        assert_eq!(m.weighted_average_score, m.average_score);
    }

    #[test]
    fn zero_weight_falls_back_to_mean() {
        let evals = vec![eval("a", "fact", 0, 6), eval("b", "fact", 0, 3)];
        let m = calculate_metrics(&evals);
        assert_eq!(m.weighted_average_score, 4.5);
    }
}
