use super::{bucket_marker, stars};
use crate::model::JudgeOutput;

fn share(n: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    n as f64 / total as f64 * 100.0
}

/// Render one document's judgment. Evaluations are listed lowest score first.
pub fn render_document(output: &JudgeOutput) -> String {
    let mut md = String::new();
    let m = &output.calculated_metrics;

    md.push_str(&format!("# Evaluation Report: {}\n\n", output.doc_id));
    md.push_str(&format!("**Timestamp:** {}\n", output.timestamp.to_rfc3339()));
    md.push_str(&format!("**Model:** {}\n", output.metadata.model));
    md.push_str(&format!(
        "**Tokens:** {} | **Cost:** ${:.4}\n\n",
        output.metadata.total_tokens, output.metadata.cost_usd
    ));

    md.push_str("## Summary Metrics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Total Claims | {} |\n", m.total_claims));
    md.push_str(&format!("| Average Score | {:.2}/10 |\n", m.average_score));
    md.push_str(&format!(
        "| Weighted Average | {:.2}/10 |\n",
        m.weighted_average_score
    ));
    for (label, n) in [
        ("Fully Reconstructed (8+)", m.fully_reconstructed),
        ("Partially Reconstructed (4-7)", m.partially_reconstructed),
        ("Not Reconstructed (<4)", m.not_reconstructed),
    ] {
        md.push_str(&format!(
            "| {} | {} ({:.1}%) |\n",
            label,
            n,
            share(n, m.total_claims)
        ));
    }
    md.push('\n');

    md.push_str("### By Claim Type\n\n");
    md.push_str("| Type | Count | Avg Score |\n");
    md.push_str("|------|-------|-----------|\n");
    for (ty, g) in &m.by_type {
        md.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            ty, g.count, g.average_score
        ));
    }
    md.push('\n');

    md.push_str("### By Importance\n\n");
    md.push_str("| Importance | Count | Avg Score |\n");
    md.push_str("|------------|-------|-----------|\n");
    for (level, g) in m.by_importance.iter().rev() {
        md.push_str(&format!(
            "| {} ({}) | {} | {:.2} |\n",
            stars(*level),
            level,
            g.count,
            g.average_score
        ));
    }
    md.push('\n');

    md.push_str("## Claim Evaluations\n\n");
    let mut evals: Vec<_> = output.claim_evaluations.iter().collect();
    evals.sort_by_key(|e| e.score);

    for e in evals {
        md.push_str(&format!(
            "### {}: {} {}/10\n\n",
            e.claim_id,
            bucket_marker(e.score),
            e.score
        ));
        md.push_str(&format!(
            "**Type:** {} | **Importance:** {}\n\n",
            e.claim_type,
            stars(e.importance)
        ));
        md.push_str(&format!("> {}\n\n", e.claim_text));
        md.push_str(&format!("**Justification:** {}\n\n", e.justification));
        if !e.evidence_refs.is_empty() {
            md.push_str(&format!(
                "**Evidence from:** {}\n\n",
                e.evidence_refs.join(", ")
            ));
        }
        md.push_str("---\n\n");
    }

    md
}
