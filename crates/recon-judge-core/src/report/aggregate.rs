use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::stars;
use crate::model::AggregateStats;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Render the corpus-level report. `generated_at` is passed in so output is
/// reproducible.
pub fn render_aggregate(stats: &AggregateStats, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();
    let o = &stats.overall;

    md.push_str("# Aggregate Evaluation Report\n\n");
    md.push_str(&format!("**Total Documents:** {}\n", stats.total_documents));
    md.push_str(&format!("**Total Claims:** {}\n", stats.total_claims));
    md.push_str(&format!("**Generated:** {}\n\n", generated_at.to_rfc3339()));

    md.push_str("## Overall Results\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Average Score | {:.2}/10 |\n", o.average_score));
    md.push_str(&format!(
        "| Weighted Average | {:.2}/10 |\n",
        o.weighted_average_score
    ));
    md.push_str(&format!(
        "| Fully Reconstructed (8+) | {:.1}% |\n",
        o.pct_fully_reconstructed
    ));
    md.push_str(&format!(
        "| Partially Reconstructed (4-7) | {:.1}% |\n",
        o.pct_partially_reconstructed
    ));
    md.push_str(&format!(
        "| Not Reconstructed (<4) | {:.1}% |\n\n",
        o.pct_not_reconstructed
    ));

    let mut types: Vec<_> = stats.by_claim_type.iter().collect();
    types.sort_by(|a, b| descending(a.1.average_score, b.1.average_score));

    md.push_str("## By Claim Type\n\n");
    md.push_str("| Type | Count | Avg Score | % Reconstructed |\n");
    md.push_str("|------|-------|-----------|-----------------|\n");
    for (ty, g) in &types {
        md.push_str(&format!(
            "| {} | {} | {:.2} | {:.1}% |\n",
            ty, g.count, g.average_score, g.pct_reconstructed
        ));
    }
    md.push('\n');

    md.push_str("## By Importance Level\n\n");
    md.push_str("| Importance | Count | Avg Score | % Reconstructed |\n");
    md.push_str("|------------|-------|-----------|-----------------|\n");
    for (level, g) in stats.by_importance.iter().rev() {
        md.push_str(&format!(
            "| {} | {} | {:.2} | {:.1}% |\n",
            stars(*level),
            g.count,
            g.average_score,
            g.pct_reconstructed
        ));
    }
    md.push('\n');

    let mut docs: Vec<_> = stats.by_document.iter().collect();
    docs.sort_by(|a, b| descending(a.weighted_average_score, b.weighted_average_score));

    md.push_str("## Per-Document Results\n\n");
    md.push_str("| Document | Claims | Avg Score | Weighted Avg |\n");
    md.push_str("|----------|--------|-----------|--------------|\n");
    for d in docs {
        md.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} |\n",
            d.doc_id, d.claim_count, d.average_score, d.weighted_average_score
        ));
    }
    md.push('\n');

    md.push_str("## Key Findings\n\n");
    if let (Some((best, b)), Some((worst, w))) = (types.first(), types.last()) {
        md.push_str(&format!(
            "- **Most reconstructable claim type:** {} (avg: {:.2})\n",
            best, b.average_score
        ));
        md.push_str(&format!(
            "- **Least reconstructable claim type:** {} (avg: {:.2})\n",
            worst, w.average_score
        ));
    }
    if let (Some(high), Some(low)) = (stats.by_importance.get(&5), stats.by_importance.get(&1)) {
        md.push_str(&format!(
            "- **High importance (5★) claims:** {:.2} avg score\n",
            high.average_score
        ));
        md.push_str(&format!(
            "- **Low importance (1★) claims:** {:.2} avg score\n",
            low.average_score
        ));
    }

    md
}
